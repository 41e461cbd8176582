use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};

const MIN_BASKET_HEIGHT: u16 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: pool beside a two-column basket grid
    Medium, // 60-99 cols: pool beside a single basket column
    Narrow, // <60 cols: pool stacked above the baskets
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn basket_columns(&self) -> usize {
        match self {
            LayoutTier::Wide => 2,
            LayoutTier::Medium | LayoutTier::Narrow => 1,
        }
    }

    pub fn stacked(&self) -> bool {
        *self == LayoutTier::Narrow
    }
}

/// What a terminal cell belongs to on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// A keyword line in the pool, by display index.
    PoolRow(usize),
    /// Pool area outside any keyword line.
    Pool,
    /// A keyword line inside basket `.0`, by display index `.1`.
    BasketRow(usize, usize),
    /// Basket area outside any keyword line (border, title, empty space).
    Basket(usize),
}

/// Geometry of the board. Rendering and mouse handling both derive their
/// rectangles from here so a click always lands where the widget was drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardLayout {
    pub header: Rect,
    pub pool: Rect,
    pub baskets_panel: Rect,
    pub baskets: Vec<Rect>,
    pub stats: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl BoardLayout {
    pub fn new(area: Rect, basket_count: usize, show_stats: bool) -> Self {
        let tier = LayoutTier::from_area(area);

        let mut constraints = vec![Constraint::Length(3), Constraint::Min(6)];
        if show_stats {
            constraints.push(Constraint::Length(5));
        }
        constraints.push(Constraint::Length(1));
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let (main, stats, footer) = if show_stats {
            (vertical[1], Some(vertical[2]), vertical[3])
        } else {
            (vertical[1], None, vertical[2])
        };

        let split = if tier.stacked() {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(main)
        } else {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(33), Constraint::Percentage(67)])
                .split(main)
        };

        let baskets_panel = split[1];
        let baskets = basket_grid(
            baskets_panel.inner(Margin::new(1, 1)),
            basket_count,
            tier.basket_columns(),
        );

        Self {
            header: vertical[0],
            pool: split[0],
            baskets_panel,
            baskets,
            stats,
            footer,
            tier,
        }
    }

    /// Area in which pool keyword lines are drawn, one per row.
    pub fn pool_rows(&self) -> Rect {
        self.pool.inner(Margin::new(1, 1))
    }

    /// Area in which basket `index`'s keyword lines are drawn, one per row.
    pub fn basket_rows(&self, index: usize) -> Option<Rect> {
        self.baskets.get(index).map(|r| r.inner(Margin::new(1, 1)))
    }

    /// Map a terminal cell to the board. `pool_scroll` is the index of the
    /// first keyword drawn in the pool, so `PoolRow` carries the keyword's
    /// index in the pool rather than its screen row.
    pub fn hit(&self, column: u16, row: u16, pool_scroll: usize) -> Option<Hit> {
        let pos = Position::new(column, row);

        for (i, rect) in self.baskets.iter().enumerate() {
            if rect.contains(pos) {
                return match self.basket_rows(i) {
                    Some(rows) if rows.contains(pos) => {
                        Some(Hit::BasketRow(i, (row - rows.y) as usize))
                    }
                    _ => Some(Hit::Basket(i)),
                };
            }
        }

        if self.pool.contains(pos) {
            let rows = self.pool_rows();
            if rows.contains(pos) {
                return Some(Hit::PoolRow(pool_scroll + (row - rows.y) as usize));
            }
            return Some(Hit::Pool);
        }

        None
    }
}

/// Lay out `count` boxes in a grid of `columns`, row-major. Boxes that no
/// longer fit vertically get a zero-sized rect so indices stay aligned with
/// the basket list.
fn basket_grid(area: Rect, count: usize, columns: usize) -> Vec<Rect> {
    if count == 0 || columns == 0 || area.width == 0 || area.height == 0 {
        return vec![Rect::default(); count];
    }
    let rows = count.div_ceil(columns) as u16;
    let row_height = (area.height / rows).max(MIN_BASKET_HEIGHT);
    let col_width = area.width / columns as u16;

    (0..count)
        .map(|i| {
            let r = (i / columns) as u16;
            let c = (i % columns) as u16;
            let y = area.y.saturating_add(r.saturating_mul(row_height));
            if y >= area.bottom() {
                return Rect::default();
            }
            let height = row_height.min(area.bottom() - y);
            let width = if c as usize == columns - 1 {
                area.width - c * col_width
            } else {
                col_width
            };
            Rect::new(area.x + c * col_width, y, width, height)
        })
        .collect()
}

/// Greedily pack key hints onto as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut current = String::from(" ");

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if current.trim().is_empty() {
            format!("{current}{hint}")
        } else {
            format!("{current}  {hint}")
        };
        if candidate.chars().count() <= width || current.trim().is_empty() {
            current = candidate;
        } else {
            out.push(current);
            current = format!(" {hint}");
        }
    }

    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 7;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_width() {
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 120, 40)), LayoutTier::Wide);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 80, 40)), LayoutTier::Medium);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 50, 40)), LayoutTier::Narrow);
    }

    #[test]
    fn wide_layout_places_two_baskets_side_by_side() {
        let layout = BoardLayout::new(Rect::new(0, 0, 120, 40), 2, false);
        assert_eq!(layout.baskets.len(), 2);
        assert_eq!(layout.baskets[0].y, layout.baskets[1].y);
        assert!(layout.baskets[0].right() <= layout.baskets[1].x);
        assert!(layout.pool.right() <= layout.baskets_panel.x);
        assert!(layout.stats.is_none());
    }

    #[test]
    fn narrow_layout_stacks_pool_above_baskets() {
        let layout = BoardLayout::new(Rect::new(0, 0, 50, 40), 1, true);
        assert!(layout.pool.bottom() <= layout.baskets_panel.y);
        assert!(layout.stats.is_some());
    }

    #[test]
    fn hit_maps_pool_rows_and_baskets() {
        let layout = BoardLayout::new(Rect::new(0, 0, 120, 40), 3, false);

        let rows = layout.pool_rows();
        assert_eq!(layout.hit(rows.x, rows.y, 0), Some(Hit::PoolRow(0)));
        assert_eq!(layout.hit(rows.x + 2, rows.y + 3, 0), Some(Hit::PoolRow(3)));
        assert_eq!(layout.hit(layout.pool.x, layout.pool.y, 0), Some(Hit::Pool));

        let third = layout.baskets[2];
        assert_eq!(layout.hit(third.x, third.y, 0), Some(Hit::Basket(2)));
        assert_eq!(layout.hit(third.x + 1, third.y + 2, 0), Some(Hit::BasketRow(2, 1)));

        assert_eq!(layout.hit(0, 0, 0), None);
    }

    #[test]
    fn pool_hits_account_for_scroll() {
        let layout = BoardLayout::new(Rect::new(0, 0, 120, 40), 1, false);
        let rows = layout.pool_rows();
        assert_eq!(layout.hit(rows.x, rows.y, 7), Some(Hit::PoolRow(7)));
        assert_eq!(layout.hit(rows.x, rows.y + 2, 7), Some(Hit::PoolRow(9)));

        // Basket rows are never scrolled.
        let basket = layout.basket_rows(0).unwrap();
        assert_eq!(layout.hit(basket.x, basket.y, 7), Some(Hit::BasketRow(0, 0)));
    }

    #[test]
    fn overflowing_baskets_keep_their_index() {
        let layout = BoardLayout::new(Rect::new(0, 0, 80, 20), 12, false);
        assert_eq!(layout.baskets.len(), 12);
        assert!(layout.baskets.last().unwrap().is_empty());
    }

    #[test]
    fn pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[a] Add", "[b] Basket", "[q] Quit"], 22);
        assert_eq!(lines, vec![" [a] Add  [b] Basket", " [q] Quit"]);
        assert!(pack_hint_lines(&[], 40).is_empty());
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 30, 5);
        let popup = centered_rect(50, 50, area);
        assert!(popup.width <= area.width && popup.height <= area.height);
    }
}
