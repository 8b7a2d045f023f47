use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::debug;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::config::AppConfig;
use crate::datastore::DataStore;
use crate::live::{
    ContactFeed, EventFeed, Feed, LiveCollection, LiveItem, NewsFeed, PrayerFeed, RefreshSubject,
    Subscription,
};
use crate::prayer_times::PrayerBoard;
use crate::tui::events::{Channel, Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::statusbar::Status;
use crate::tui::widgets::{contacts, detail, events, header, news, next_prayer, prayers, statusbar};
use crate::utils::ticker::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Prayers,
    News,
    Events,
    Contacts,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Prayers, Tab::News, Tab::Events, Tab::Contacts];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Prayers => "Prayers",
            Tab::News => "News",
            Tab::Events => "Events",
            Tab::Contacts => "Contact",
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Prayers => 0,
            Tab::News => 1,
            Tab::Events => 2,
            Tab::Contacts => 3,
        }
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

enum DetailItem {
    News(LiveItem<NewsFeed>),
    Event(LiveItem<EventFeed>),
}

/// An open detail screen. Its row-level channel lives exactly as long as it does.
struct DetailView {
    item: DetailItem,
    _subscription: Subscription,
}

pub struct App {
    store: Arc<dyn DataStore>,
    config: AppConfig,
    tx: Sender<Event>,
    pub tab: Tab,
    pub selected: usize,
    pub show_help: bool,
    pub should_quit: bool,
    board: PrayerBoard,
    news: LiveCollection<NewsFeed>,
    events: LiveCollection<EventFeed>,
    contacts: LiveCollection<ContactFeed>,
    detail: Option<DetailView>,
    subscriptions: Vec<Subscription>,
}

/// A refresh callback that posts `channel` back to the UI loop.
fn notifier(tx: &Sender<Event>, channel: Channel) -> impl Fn() + Send + Sync + 'static {
    let tx = tx.clone();
    move || {
        if tx.send(Event::Refresh(channel)).is_err() {
            debug!("UI loop gone; dropping {:?} refresh", channel);
        }
    }
}

impl App {
    pub fn new(store: Arc<dyn DataStore>, config: AppConfig, tx: Sender<Event>) -> Result<Self> {
        let rule = config.weekly_rule()?;
        Ok(App {
            store,
            config,
            tx,
            tab: Tab::Prayers,
            selected: 0,
            show_help: false,
            should_quit: false,
            board: PrayerBoard::new(PrayerFeed::default(), rule),
            news: LiveCollection::new(NewsFeed::default()),
            events: LiveCollection::new(EventFeed::default()),
            contacts: LiveCollection::new(ContactFeed::default()),
            detail: None,
            subscriptions: Vec::new(),
        })
    }

    /// Opens one standing change channel per collection.
    pub fn open_channels(&mut self) {
        let subjects: [(crate::datastore::Table, RefreshSubject); 4] = [
            (
                PrayerFeed::TABLE,
                self.board.subject(notifier(&self.tx, Channel::Prayers)),
            ),
            (
                NewsFeed::TABLE,
                self.news.subject(notifier(&self.tx, Channel::News)),
            ),
            (
                EventFeed::TABLE,
                self.events.subject(notifier(&self.tx, Channel::Events)),
            ),
            (
                ContactFeed::TABLE,
                self.contacts.subject(notifier(&self.tx, Channel::Contacts)),
            ),
        ];
        self.subscriptions = subjects
            .into_iter()
            .map(|(table, subject)| Subscription::open(self.store.clone(), table, None, subject))
            .collect();
    }

    pub fn load_all(&mut self) {
        for channel in [Channel::Prayers, Channel::News, Channel::Events, Channel::Contacts] {
            self.refresh(channel);
        }
    }

    pub fn refresh(&mut self, channel: Channel) {
        let store = self.store.as_ref();
        match channel {
            Channel::Prayers => self.board.load(store, Local::now().naive_local()),
            Channel::News => {
                self.news.load(store);
            }
            Channel::Events => {
                self.events.load(store);
            }
            Channel::Contacts => {
                self.contacts.load(store);
            }
            Channel::Detail => match self.detail.as_mut().map(|d| &mut d.item) {
                Some(DetailItem::News(view)) => view.load(store),
                Some(DetailItem::Event(view)) => view.load(store),
                None => {}
            },
        }
        self.clamp_selection();
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick => {}
            Event::Recompute => self.board.tick(Local::now().naive_local()),
            Event::Refresh(channel) => {
                debug!("Change notification for {:?}", channel);
                self.refresh(channel);
            }
        }
    }

    fn list_len(&self) -> usize {
        match self.tab {
            Tab::Prayers => self.board.slots().items().len(),
            Tab::News => self.news.items().len(),
            Tab::Events => self.events.items().len(),
            Tab::Contacts => self.contacts.items().len(),
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.list_len().saturating_sub(1));
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle actual key presses; some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        if self.detail.is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Backspace => self.detail = None,
                KeyCode::Char('r') => self.refresh(Channel::Detail),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.refresh(match self.tab {
                Tab::Prayers => Channel::Prayers,
                Tab::News => Channel::News,
                Tab::Events => Channel::Events,
                Tab::Contacts => Channel::Contacts,
            }),
            KeyCode::Tab | KeyCode::Right => self.switch_tab(self.tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.switch_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.switch_tab(Tab::ALL[idx]);
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.list_len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.open_detail(),
            _ => {}
        }
    }

    fn open_detail(&mut self) {
        let store = self.store.as_ref();
        let (item, table, id) = match self.tab {
            Tab::News => {
                let Some(selected) = self.news.items().get(self.selected) else {
                    return;
                };
                let mut view = LiveItem::new(NewsFeed::default(), selected.id.clone());
                view.load(store);
                (DetailItem::News(view), NewsFeed::TABLE, selected.id.clone())
            }
            Tab::Events => {
                let Some(selected) = self.events.items().get(self.selected) else {
                    return;
                };
                let mut view = LiveItem::new(EventFeed::default(), selected.id.clone());
                view.load(store);
                (DetailItem::Event(view), EventFeed::TABLE, selected.id.clone())
            }
            Tab::Prayers | Tab::Contacts => return,
        };

        let on_refresh = notifier(&self.tx, Channel::Detail);
        let subject = match &item {
            DetailItem::News(view) => view.subject(on_refresh),
            DetailItem::Event(view) => view.subject(on_refresh),
        };
        let subscription = Subscription::open(self.store.clone(), table, Some(&id), subject);
        self.detail = Some(DetailView {
            item,
            _subscription: subscription,
        });
    }

    fn status_error(&self) -> Option<&str> {
        if let Some(detail) = &self.detail {
            return match &detail.item {
                DetailItem::News(view) => view.error(),
                DetailItem::Event(view) => view.error(),
            };
        }
        match self.tab {
            Tab::Prayers => self.board.slots().error(),
            Tab::News => self.news.error(),
            Tab::Events => self.events.error(),
            Tab::Contacts => self.contacts.error(),
        }
    }

    fn last_updated(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self.tab {
            Tab::Prayers => self.board.slots().last_updated(),
            Tab::News => self.news.last_updated(),
            Tab::Events => self.events.last_updated(),
            Tab::Contacts => self.contacts.last_updated(),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let now = Local::now();
        let twelve = self.config.display.twelve_hour;

        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // header
                Constraint::Length(1), // tabs
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            chunks[0],
            &self.config.display.organization_name,
            &self.board,
            now,
        );
        self.draw_tabs(frame, chunks[1]);

        let body = chunks[2];
        match self.detail.as_ref().map(|d| &d.item) {
            Some(DetailItem::News(view)) => detail::render_news(frame, body, view, now),
            Some(DetailItem::Event(view)) => detail::render_event(frame, body, view, twelve),
            None => match self.tab {
                Tab::Prayers => {
                    let columns = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                        .split(body);
                    prayers::render(frame, columns[0], &self.board, twelve);
                    let right = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Length(8), Constraint::Min(0)])
                        .split(columns[1]);
                    next_prayer::render(frame, right[0], &self.board, twelve);
                }
                Tab::News => news::render(frame, body, &self.news, self.selected, now),
                Tab::Events => events::render(frame, body, &self.events, self.selected, twelve),
                Tab::Contacts => contacts::render(frame, body, &self.contacts, self.selected),
            },
        }

        statusbar::render(
            frame,
            chunks[3],
            &Status {
                error: self.status_error(),
                last_updated: self.last_updated(),
                in_detail: self.detail.is_some(),
            },
        );

        if self.show_help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<String> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| format!(" {} {} ", i + 1, tab.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .style(theme::dim())
            .highlight_style(theme::gold().add_modifier(Modifier::BOLD))
            .divider(Span::styled("·", theme::dim()));
        frame.render_widget(tabs, area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(12).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[1-4] / Tab", "Switch screen"),
            ("[↑ ↓]", "Move selection"),
            ("[Enter]", "Open announcement / event"),
            ("[r]", "Refresh now"),
            ("[Esc]", "Back / quit"),
            ("[?]", "Toggle help"),
            ("[q]", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<14}", key), theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  The board updates itself when content changes.",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut App, events: &EventHandler) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;
        app.handle_event(events.next()?);
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the TUI event loop.
pub fn run(store: Arc<dyn DataStore>, config: AppConfig) -> Result<()> {
    let events = EventHandler::new(config.tui.tick_rate_ms);
    let recompute_every = config.recompute_interval();

    let mut app = App::new(store, config, events.sender())?;
    app.open_channels();
    app.load_all();

    let recompute_tx = events.sender();
    let _recompute = Ticker::spawn(recompute_every, move || {
        recompute_tx.send(Event::Recompute).is_ok()
    });

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app, &events);
    ratatui::restore();
    result
}
