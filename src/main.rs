mod app;
mod config;
mod event;
mod logging;
mod session;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, Overlay, PromptKind};
use config::Config;
use event::{AppEvent, EventHandler};
use session::study::Mode;
use ui::components::basket_grid::BasketGrid;
use ui::components::dialog::{MessageDialog, MessageTone, PromptDialog};
use ui::components::feedback_toast::FeedbackToast;
use ui::components::keyword_pool::KeywordPool;
use ui::components::stats_footer::StatsFooter;
use ui::layout::{BoardLayout, pack_hint_lines};
use ui::line_input::InputResult;

#[derive(Parser)]
#[command(
    name = "keybasket",
    version,
    about = "Sort keywords into lesson baskets, then drill yourself on them"
)]
struct Cli {
    #[arg(help = "Study document to load at startup")]
    file: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Subject for the opened document")]
    subject: Option<String>,

    #[arg(short, long, help = "Directory for saved documents")]
    document_dir: Option<String>,
}

const EDIT_HINTS: &[&str] = &[
    "[a] Keyword",
    "[b] Basket",
    "[Space] Grab/Drop",
    "[1-9] Drop on basket",
    "[Tab] Panel",
    "[x] Delete",
    "[p] Play",
    "[s] Save",
    "[o] Load",
    "[?] Help",
    "[q] Quit",
];

const PLAY_HINTS: &[&str] = &[
    "[Space] Grab/Drop",
    "[1-9] Drop on basket",
    "[Tab] Panel",
    "[r] Reset",
    "[e] Edit",
    "[?] Help",
    "[q] Quit",
];

const HELP_LINES: &[&str] = &[
    "a / b       add a keyword / lesson basket",
    "n           rename the subject",
    "x, Del      delete the focused keyword or basket",
    "Tab, h, l   switch between pool and baskets",
    "j, k        move the selection",
    "Space       grab the selected keyword, or drop it",
    "Enter       drop onto the selected target",
    "1-9         drop onto basket N",
    "Esc         let go of the held keyword",
    "p / r / e   play / reset round / back to editing",
    "s / o       save / load a document",
    "t           next theme",
    "mouse       drag keywords between pool and baskets",
    "q           quit",
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.document_dir {
        config.document_dir = dir;
    }
    config.validate();

    let _log_guard = logging::init(&config.log_filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "keybasket starting");

    let mut app = App::new(config);
    if let Some(path) = cli.file {
        app.import_document(&path);
    }
    if let Some(subject) = cli.subject {
        app.session.rename_subject(&subject);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %format!("{err:#}"), "event loop failed");
        eprintln!("Error: {err:?}");
    }
    tracing::info!("keybasket exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    let mut area = Rect::default();
    loop {
        terminal.draw(|frame| {
            area = frame.area();
            let visible = board_layout(app, area).pool_rows().height as usize;
            app.scroll_pool_into_view(visible);
            render(frame, app);
        })?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse, area),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match &mut app.overlay {
        Overlay::Prompt { kind, input } => {
            let kind = *kind;
            match input.handle(key) {
                InputResult::Continue => {}
                InputResult::Cancel => app.dismiss_overlay(),
                InputResult::Submit => {
                    let value = input.value().to_string();
                    app.dismiss_overlay();
                    app.submit_prompt(kind, &value);
                }
            }
            return;
        }
        Overlay::Warning(_) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_overlay();
            }
            return;
        }
        Overlay::Help => {
            app.dismiss_overlay();
            return;
        }
        Overlay::None => {}
    }

    app.status = None;

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        KeyCode::Char('a') => app.open_prompt(PromptKind::AddKeyword),
        KeyCode::Char('b') => app.open_prompt(PromptKind::AddBasket),
        KeyCode::Char('n') => app.open_prompt(PromptKind::RenameSubject),
        KeyCode::Char('s') => app.open_prompt(PromptKind::Export),
        KeyCode::Char('o') => app.open_prompt(PromptKind::Import),
        KeyCode::Char('x') | KeyCode::Delete => app.delete_focused(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char('h') | KeyCode::Left => app.focus = app::Focus::Pool,
        KeyCode::Char('l') | KeyCode::Right => {
            if app.focus == app::Focus::Pool {
                app.toggle_focus();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char(' ') | KeyCode::Enter => app.activate(),
        KeyCode::Char(ch @ '1'..='9') => {
            app.drop_on_basket_number(ch as usize - '0' as usize);
        }
        KeyCode::Esc => app.cancel_drag(),
        KeyCode::Char('p') => app.start_play(),
        KeyCode::Char('r') => app.reset_play(),
        KeyCode::Char('e') => app.exit_play(),
        KeyCode::Char('t') => {
            app.cycle_theme();
            if let Err(e) = app.config.save() {
                tracing::warn!(error = %format!("{e:#}"), "could not save config");
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, area: Rect) {
    if !matches!(app.overlay, Overlay::None) {
        return;
    }
    let hit = board_layout(app, area).hit(mouse.column, mouse.row, app.pool_scroll);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.status = None;
            app.mouse_down(hit);
        }
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(hit),
        MouseEventKind::ScrollDown => app.move_cursor(1),
        MouseEventKind::ScrollUp => app.move_cursor(-1),
        _ => {}
    }
}

fn board_layout(app: &App, area: Rect) -> BoardLayout {
    BoardLayout::new(
        area,
        app.session.catalog().baskets().len(),
        app.session.mode() == Mode::Play,
    )
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let playing = app.session.mode() == Mode::Play;
    let layout = board_layout(app, area);

    render_header(frame, app, layout.header);

    frame.render_widget(
        KeywordPool::new(&app.session, app.pool_selection(), app.pool_scroll, app.theme),
        layout.pool,
    );
    frame.render_widget(
        BasketGrid::new(&app.session, &layout, app.basket_focus(), app.theme),
        layout.baskets_panel,
    );
    if let Some(stats) = layout.stats {
        frame.render_widget(StatsFooter::new(&app.session, app.theme), stats);
    }

    let footer_text = match &app.status {
        Some(status) => format!(" {status}"),
        None => {
            let hints = if playing { PLAY_HINTS } else { EDIT_HINTS };
            pack_hint_lines(hints, layout.footer.width as usize)
                .into_iter()
                .next()
                .unwrap_or_default()
        }
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer_text,
            Style::default().fg(colors.muted()),
        ))),
        layout.footer,
    );

    if let Some(kind) = app.session.feedback(Instant::now()) {
        frame.render_widget(FeedbackToast::new(kind, app.theme), area);
    }

    match &app.overlay {
        Overlay::None => {}
        Overlay::Prompt { kind, input } => {
            frame.render_widget(PromptDialog::new(kind.title(), input, app.theme), area);
        }
        Overlay::Warning(message) => {
            frame.render_widget(
                MessageDialog::new("Notice", vec![message.clone()], MessageTone::Warning, app.theme),
                area,
            );
        }
        Overlay::Help => {
            let lines = HELP_LINES.iter().map(|l| l.to_string()).collect();
            frame.render_widget(
                MessageDialog::new("Keys", lines, MessageTone::Info, app.theme),
                area,
            );
        }
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let mode = match app.session.mode() {
        Mode::Edit => " EDIT ",
        Mode::Play => " PLAY ",
    };

    let mut spans = vec![
        Span::styled(
            " keybasket ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", app.session.subject()),
            Style::default().fg(colors.fg()).bg(colors.header_bg()),
        ),
        Span::styled(
            mode,
            Style::default()
                .fg(colors.bg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ),
    ];

    let held = app
        .session
        .dragged()
        .and_then(|id| app.session.catalog().keyword(id));
    if let Some(keyword) = held {
        spans.push(Span::styled(
            format!("  holding \u{00bb} {}", keyword.name),
            Style::default().fg(colors.grabbed()).bg(colors.header_bg()),
        ));
    }

    let header = Paragraph::new(vec![Line::from(""), Line::from(spans)])
        .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}
