use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use std::time::{Duration, Instant};
use anyhow::Result;
use fuzztrie::node::{letters, mask_of, mask_letters};
use fuzztrie::Dictionary;
use std::sync::Arc;
use tracing::{debug, warn};

const LIST_SIZE: usize = 50;
const DEBOUNCE_DELAY_MS: u64 = 150;

pub struct AppState {
    input: String,
    mode: Mode,
    results: Arc<Vec<String>>,
    selected_idx: usize,
    details: Vec<String>,
    dictionary: Arc<Dictionary>,
    message: Option<String>,
    list_scroll: usize,
    last_input_time: Instant,
    pending_query: bool,
    visible_list_range: (usize, usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Prefix,
    Fuzzy,
}

pub async fn run_tui(dictionary: Dictionary) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let dictionary = Arc::new(dictionary);
    let mut app = AppState {
        input: String::new(),
        mode: Mode::Prefix,
        results: Arc::new(dictionary.words().await),
        selected_idx: 0,
        details: Vec::new(),
        dictionary,
        message: None,
        list_scroll: 0,
        last_input_time: Instant::now(),
        pending_query: false,
        visible_list_range: (0, 0),
    };
    refresh_details(&mut app).await;

    loop {
        let now = Instant::now();

        // Run the query once typing pauses
        if app.pending_query && app.last_input_time.elapsed() > Duration::from_millis(DEBOUNCE_DELAY_MS) {
            run_query(&mut app).await;
            app.pending_query = false;
        }

        terminal.draw(|f| render_ui(f, &mut app))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Tab => toggle_mode(&mut app),
                    _ => handle_key(&mut app, key.code).await,
                }
            }
        }

        // Cap the frame rate
        let elapsed = now.elapsed();
        if elapsed < Duration::from_millis(16) {
            tokio::time::sleep(Duration::from_millis(16) - elapsed).await;
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn toggle_mode(app: &mut AppState) {
    app.mode = match app.mode {
        Mode::Prefix => Mode::Fuzzy,
        Mode::Fuzzy => Mode::Prefix,
    };
    mark_dirty(app);
}

fn mark_dirty(app: &mut AppState) {
    app.pending_query = true;
    app.last_input_time = Instant::now();
}

async fn handle_key(app: &mut AppState, key: KeyCode) {
    match key {
        KeyCode::Char(c) => {
            app.input.push(c);
            mark_dirty(app);
        }
        KeyCode::Backspace => {
            app.input.pop();
            mark_dirty(app);
        }
        KeyCode::Up => {
            if app.selected_idx > 0 {
                app.selected_idx -= 1;
                select_changed(app).await;
            }
        }
        KeyCode::Down => {
            if app.selected_idx + 1 < app.results.len() {
                app.selected_idx += 1;
                select_changed(app).await;
            }
        }
        KeyCode::PageUp => {
            app.selected_idx = app.selected_idx.saturating_sub(LIST_SIZE);
            select_changed(app).await;
        }
        KeyCode::PageDown => {
            app.selected_idx = (app.selected_idx + LIST_SIZE).min(app.results.len().saturating_sub(1));
            select_changed(app).await;
        }
        KeyCode::Enter => {
            // Skip the debounce
            run_query(app).await;
            app.pending_query = false;
        }
        KeyCode::Delete => delete_selected(app).await,
        _ => {}
    }
}

async fn select_changed(app: &mut AppState) {
    update_list_scroll(app);
    refresh_details(app).await;
}

fn update_list_scroll(app: &mut AppState) {
    let visible_height = app.visible_list_range.1 - app.visible_list_range.0;

    if app.selected_idx < app.list_scroll {
        app.list_scroll = app.selected_idx;
    } else if visible_height > 0 && app.selected_idx >= app.list_scroll + visible_height {
        app.list_scroll = app.selected_idx - visible_height + 1;
    }
}

async fn run_query(app: &mut AppState) {
    let result = match app.mode {
        Mode::Prefix => app.dictionary.words_starting_with(&app.input).await.map(Arc::new),
        Mode::Fuzzy => app.dictionary.fuzzy_matches(&app.input).await,
    };

    match result {
        Ok(results) => {
            debug!(query = %app.input, mode = ?app.mode, hits = results.len(), "query");
            app.results = results;
            app.message = None;
        }
        Err(err) => {
            app.results = Arc::new(Vec::new());
            app.message = Some(err.to_string());
        }
    }
    app.selected_idx = 0;
    app.list_scroll = 0;
    refresh_details(app).await;
}

async fn delete_selected(app: &mut AppState) {
    let Some(word) = app.results.get(app.selected_idx).cloned() else {
        return;
    };

    match app.dictionary.remove_word(&word).await {
        Ok(()) => {
            app.message = Some(format!("Removed {word:?}"));
            let keep = app.selected_idx;
            run_query(app).await;
            app.selected_idx = keep.min(app.results.len().saturating_sub(1));
            select_changed(app).await;
        }
        Err(err) => {
            warn!(%word, error = %err, "remove failed");
            app.message = Some(err.to_string());
        }
    }
}

async fn refresh_details(app: &mut AppState) {
    let Some(word) = app.results.get(app.selected_idx).cloned() else {
        app.details = vec!["No words found".to_string()];
        return;
    };

    let mask = letters(&word).map(|l| mask_of(&l)).unwrap_or(0);
    let mut details = vec![
        format!("Word:     {word}"),
        format!("Length:   {}", word.chars().count()),
        format!("Letters:  {}", mask_letters(mask)),
        String::new(),
        "Words sharing each prefix:".to_string(),
    ];

    for end in 1..=word.len() {
        let prefix = &word[..end];
        let count = app
            .dictionary
            .words_starting_with(prefix)
            .await
            .map(|w| w.len())
            .unwrap_or(0);
        details.push(format!("  {prefix:<24} {count}"));
    }

    app.details = details;
}

fn render_ui<B: tui::backend::Backend>(f: &mut tui::Frame<B>, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(10),
            ]
                .as_ref(),
        )
        .split(f.size());

    render_status_bar(f, app, chunks[0]);
    render_input(f, app, chunks[1]);
    render_main_content(f, app, chunks[2]);
}

fn render_status_bar<B: tui::backend::Backend>(f: &mut tui::Frame<B>, app: &AppState, area: Rect) {
    let status = match &app.message {
        Some(message) => message.clone(),
        None => {
            let mode = match app.mode {
                Mode::Prefix => "PREFIX",
                Mode::Fuzzy => "FUZZY",
            };
            format!(
                "{mode} [Tab:Mode Del:Remove Esc:Quit]  {} matches",
                app.results.len()
            )
        }
    };

    let status_bar = Paragraph::new(status)
        .block(Block::default())
        .style(Style::default().bg(Color::DarkGray));

    f.render_widget(status_bar, area);
}

fn render_input<B: tui::backend::Backend>(f: &mut tui::Frame<B>, app: &AppState, area: Rect) {
    let input_text = match app.mode {
        Mode::Prefix => format!("> {}", app.input),
        Mode::Fuzzy => format!("~ {}", app.input),
    };

    let input = Paragraph::new(input_text.as_str())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(input, area);
}

fn render_main_content<B: tui::backend::Backend>(f: &mut tui::Frame<B>, app: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(area);

    render_word_list(f, app, chunks[0]);
    render_details(f, app, chunks[1]);
}

fn render_word_list<B: tui::backend::Backend>(f: &mut tui::Frame<B>, app: &mut AppState, area: Rect) {
    // Borders take two rows
    let height = (area.height as usize).saturating_sub(2);
    app.visible_list_range = (app.list_scroll, app.list_scroll + height);

    let start = app.list_scroll.min(app.results.len());
    let end = std::cmp::min(app.list_scroll + height, app.results.len());
    let visible_words = &app.results[start..end];

    let items: Vec<ListItem> = visible_words
        .iter()
        .map(|word| ListItem::new(highlight_matches(word, &app.input, app.mode)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Words"))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !visible_words.is_empty() {
        state.select(Some(app.selected_idx.saturating_sub(app.list_scroll)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Colors the letters of `word` that the query matched.
fn highlight_matches<'a>(word: &'a str, query: &str, mode: Mode) -> Spans<'a> {
    let matched = Style::default().fg(Color::Yellow);
    match mode {
        Mode::Prefix => {
            let split = query.len().min(word.len());
            let (head, tail) = word.split_at(split);
            Spans::from(vec![Span::styled(head, matched), Span::raw(tail)])
        }
        Mode::Fuzzy => {
            let mut pending = query.chars().peekable();
            let spans: Vec<Span> = word
                .char_indices()
                .map(|(i, c)| {
                    let text = &word[i..i + c.len_utf8()];
                    if pending.peek() == Some(&c) {
                        pending.next();
                        Span::styled(text, matched)
                    } else {
                        Span::raw(text)
                    }
                })
                .collect();
            Spans::from(spans)
        }
    }
}

fn render_details<B: tui::backend::Backend>(f: &mut tui::Frame<B>, app: &AppState, area: Rect) {
    let content: Vec<Spans> = app
        .details
        .iter()
        .map(|line| Spans::from(Span::raw(line.as_str())))
        .collect();

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tui_tests {
    use super::*;

    fn styled(spans: &Spans) -> String {
        spans
            .0
            .iter()
            .filter(|s| s.style.fg == Some(Color::Yellow))
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn test_fuzzy_highlight_is_greedy() {
        let spans = highlight_matches("algorithm", "lgrm", Mode::Fuzzy);
        assert_eq!(styled(&spans), "lgrm");
    }

    #[test]
    fn test_prefix_highlight() {
        let spans = highlight_matches("cart", "ca", Mode::Prefix);
        assert_eq!(styled(&spans), "ca");

        let spans = highlight_matches("ca", "cart", Mode::Prefix);
        assert_eq!(styled(&spans), "ca");
    }
}
