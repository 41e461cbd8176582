pub mod basket_grid;
pub mod dialog;
pub mod feedback_toast;
pub mod keyword_pool;
pub mod stats_footer;
