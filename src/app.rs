use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::{Action, ScreenId};
use crate::browser::CityBrowser;
use crate::cities::CitySource;
use crate::detail::{WeatherDetail, WeatherFailure};
use crate::event::Event;
use crate::loader::PageTag;
use crate::route::{self, Interaction, Navigation, Route};
use crate::view::Column;
use crate::weather::WeatherProvider;

const PAGE_JUMP: isize = 10;

pub enum ScreenKind {
    Cities(CityBrowser),
    Weather(WeatherDetail),
}

pub struct Screen {
    pub id: ScreenId,
    pub route: Route,
    pub kind: ScreenKind,
}

/// A tab with its own navigation history. The root screen is never popped.
pub struct View {
    root: Screen,
    stack: Vec<Screen>,
}

impl View {
    fn new(root: Screen) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    pub fn current(&self) -> &Screen {
        self.stack.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut Screen {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    fn screens_mut(&mut self) -> impl Iterator<Item = &mut Screen> {
        std::iter::once(&mut self.root).chain(self.stack.iter_mut())
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.stack.len() + 1
    }
}

pub struct App {
    pub views: Vec<View>,
    pub active: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    next_id: ScreenId,
    cities: Arc<dyn CitySource>,
    weather: Arc<dyn WeatherProvider>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    /// Build the app on `root` and start its first load. `search` is the
    /// initial term when the root is the city list.
    pub fn new(
        cities: Arc<dyn CitySource>,
        weather: Arc<dyn WeatherProvider>,
        action_tx: mpsc::UnboundedSender<Action>,
        root: Route,
        search: &str,
    ) -> Self {
        let mut app = Self {
            views: Vec::new(),
            active: 0,
            error: None,
            notice: None,
            should_quit: false,
            next_id: 0,
            cities,
            weather,
            action_tx,
        };
        let screen = app.open_screen(root, search);
        app.views.push(View::new(screen));
        app
    }

    pub fn current(&self) -> &Screen {
        self.views[self.active].current()
    }

    fn current_mut(&mut self) -> &mut Screen {
        self.views[self.active].current_mut()
    }

    fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.views
            .iter_mut()
            .flat_map(|view| view.screens_mut())
            .find(|screen| screen.id == id)
    }

    /// Run `f` against the current screen if it is a city browser
    fn with_browser<R>(&mut self, f: impl FnOnce(&mut CityBrowser) -> R) -> Option<(ScreenId, R)> {
        let screen = self.current_mut();
        let id = screen.id;
        match &mut screen.kind {
            ScreenKind::Cities(browser) => Some((id, f(browser))),
            ScreenKind::Weather(_) => None,
        }
    }

    fn open_screen(&mut self, route: Route, search: &str) -> Screen {
        self.next_id += 1;
        let id = self.next_id;
        tracing::debug!(id, route = %route, "opening screen");

        let kind = match &route {
            Route::CityList => {
                let mut browser = CityBrowser::new();
                let tag = browser.set_search(search);
                self.spawn_load_page(id, tag);
                ScreenKind::Cities(browser)
            }
            Route::Weather(city) => {
                let mut detail = WeatherDetail::new(city.clone());
                if let Some((load_id, city)) = detail.begin_load() {
                    self.spawn_load_weather(id, load_id, city);
                }
                ScreenKind::Weather(detail)
            }
        };

        Screen { id, route, kind }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        if event.is_quit() {
            return Action::Quit;
        }
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => match &self.current().kind {
                ScreenKind::Cities(_) => Action::SearchPaste(text),
                ScreenKind::Weather(_) => Action::None,
            },
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let (search_mode, picker_open) = match &self.current().kind {
            ScreenKind::Cities(browser) => {
                (browser.search_mode, browser.dropdowns.focused().is_some())
            }
            ScreenKind::Weather(_) => (false, false),
        };

        if search_mode {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc => Action::ExitSearchMode,
                KeyCode::Backspace => Action::SearchBackspace,
                KeyCode::Char(c) => Action::SearchInput(c),
                _ => Action::None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::Char('q') => Action::Back,
            // pickers only close through a selection
            KeyCode::Esc if picker_open => Action::None,
            KeyCode::Esc => Action::Back,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter => Action::Select(Interaction::Primary),
            KeyCode::Char('o') => Action::Select(Interaction::Secondary),
            KeyCode::Tab => Action::NextView,
            KeyCode::BackTab => Action::PrevView,
            KeyCode::Char('/') => Action::EnterSearchMode,
            KeyCode::Char('1') => Action::SortBy(Column::Name),
            KeyCode::Char('2') => Action::SortBy(Column::Country),
            KeyCode::Char('3') => Action::SortBy(Column::Timezone),
            KeyCode::Char('!') => Action::ToggleFilter(Column::Name),
            KeyCode::Char('@') => Action::ToggleFilter(Column::Country),
            KeyCode::Char('#') => Action::ToggleFilter(Column::Timezone),
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('y') => Action::YankRoute,
            KeyCode::Char('b') => Action::OpenInBrowser,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::CitiesLoaded { .. } | Action::WeatherLoaded { .. } | Action::None
        ) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => self.back(),
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-PAGE_JUMP),
            Action::PageDown => self.scroll(PAGE_JUMP),
            Action::GoToTop => {
                self.with_browser(|b| {
                    if b.dropdowns.focused().is_some() {
                        b.picker_index = 0;
                    } else {
                        b.select_first();
                    }
                });
            }
            Action::GoToBottom => {
                let result = self.with_browser(|b| {
                    if b.dropdowns.focused().is_some() {
                        b.move_picker(isize::MAX);
                        None
                    } else {
                        b.select_last()
                    }
                });
                if let Some((id, Some(tag))) = result {
                    self.spawn_load_page(id, tag);
                }
            }
            Action::Select(interaction) => {
                let navigation = self.with_browser(|b| {
                    if b.dropdowns.focused().is_some() {
                        b.select_picker_entry();
                        None
                    } else {
                        b.selected_city()
                            .map(|city| route::dispatch(interaction, &city.name))
                    }
                });
                if let Some((_, Some(navigation))) = navigation {
                    self.navigate(navigation);
                }
            }
            Action::NextView => {
                self.active = (self.active + 1) % self.views.len();
            }
            Action::PrevView => {
                self.active = (self.active + self.views.len() - 1) % self.views.len();
            }
            Action::SortBy(column) => {
                self.with_browser(|b| b.toggle_sort(column));
            }
            Action::ToggleFilter(column) => {
                self.with_browser(|b| b.toggle_dropdown(column));
            }
            Action::EnterSearchMode => {
                self.with_browser(|b| b.search_mode = true);
            }
            Action::ExitSearchMode => {
                self.with_browser(|b| b.search_mode = false);
            }
            Action::SearchInput(c) => {
                if let Some((id, tag)) = self.with_browser(|b| b.push_search_char(c)) {
                    self.spawn_load_page(id, tag);
                }
            }
            Action::SearchPaste(text) => {
                if let Some((id, Some(tag))) = self.with_browser(|b| b.push_search_str(&text)) {
                    self.spawn_load_page(id, tag);
                }
            }
            Action::SearchBackspace => {
                if let Some((id, Some(tag))) = self.with_browser(|b| b.pop_search_char()) {
                    self.spawn_load_page(id, tag);
                }
            }
            Action::CitiesLoaded {
                screen,
                tag,
                result,
            } => match self.screen_mut(screen).map(|s| &mut s.kind) {
                Some(ScreenKind::Cities(browser)) => {
                    browser.apply_page(&tag, result);
                }
                _ => tracing::debug!(screen, "city page for closed screen dropped"),
            },
            Action::WeatherLoaded {
                screen,
                load_id,
                result,
            } => match self.screen_mut(screen).map(|s| &mut s.kind) {
                Some(ScreenKind::Weather(detail)) => {
                    detail.apply(load_id, result);
                }
                _ => tracing::debug!(screen, "weather for closed screen dropped"),
            },
            Action::Refresh => self.refresh(),
            Action::OpenInBrowser => self.open_in_browser(),
            Action::YankRoute => self.yank_route(),
            Action::Error(msg) => {
                tracing::warn!(error = %msg, "action failed");
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn back(&mut self) {
        if self.views[self.active].stack.pop().is_some() {
            return;
        }
        if self.views.len() > 1 {
            self.views.remove(self.active);
            self.active = self.active.min(self.views.len() - 1);
        } else {
            self.should_quit = true;
        }
    }

    fn scroll(&mut self, delta: isize) {
        let result = self.with_browser(|b| {
            if b.dropdowns.focused().is_some() {
                b.move_picker(delta);
                None
            } else {
                b.move_selection(delta)
            }
        });
        if let Some((id, Some(tag))) = result {
            self.spawn_load_page(id, tag);
        }
    }

    fn navigate(&mut self, navigation: Navigation) {
        tracing::info!(route = %navigation.route(), "navigating");
        match navigation {
            Navigation::Push(route) => {
                let screen = self.open_screen(route, "");
                self.views[self.active].stack.push(screen);
            }
            Navigation::OpenNewView(route) => {
                let screen = self.open_screen(route, "");
                self.views.push(View::new(screen));
                self.active = self.views.len() - 1;
            }
        }
    }

    fn refresh(&mut self) {
        let screen = self.current_mut();
        let id = screen.id;
        match &mut screen.kind {
            ScreenKind::Cities(browser) => {
                let tag = browser.refresh();
                self.spawn_load_page(id, tag);
            }
            ScreenKind::Weather(detail) => {
                if let Some((load_id, city)) = detail.begin_load() {
                    self.spawn_load_weather(id, load_id, city);
                }
            }
        }
    }

    fn open_in_browser(&mut self) {
        let url = match &self.current().kind {
            ScreenKind::Weather(detail) => detail
                .current()
                .and_then(|current| current.city_id)
                .and_then(|id| self.weather.city_page_url(id)),
            ScreenKind::Cities(_) => None,
        };
        let Some(url) = url else {
            return;
        };
        if let Err(e) = open::that(&url) {
            self.error = Some(format!("Failed to open {}: {}", url, e));
        }
    }

    /// Route path of whatever the current screen points at
    pub fn current_route_path(&self) -> Option<String> {
        let screen = self.current();
        match &screen.kind {
            ScreenKind::Cities(browser) => browser
                .selected_city()
                .map(|city| Route::weather(city.name.clone()).path()),
            ScreenKind::Weather(_) => Some(screen.route.path()),
        }
    }

    fn yank_route(&mut self) {
        let Some(path) = self.current_route_path() else {
            return;
        };
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(path.clone()));
        match copied {
            Ok(()) => self.notice = Some(format!("Copied {}", path)),
            Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
        }
    }

    fn spawn_load_page(&self, screen: ScreenId, tag: PageTag) {
        let tx = self.action_tx.clone();
        let cities = Arc::clone(&self.cities);
        tokio::spawn(async move {
            let result = cities
                .search(&tag.request())
                .await
                .map_err(|e| e.to_string());
            tx.send(Action::CitiesLoaded {
                screen,
                tag,
                result,
            })
            .ok();
        });
    }

    fn spawn_load_weather(&self, screen: ScreenId, load_id: u64, city: String) {
        let tx = self.action_tx.clone();
        let weather = Arc::clone(&self.weather);
        tokio::spawn(async move {
            let (current, forecast) = tokio::join!(weather.current(&city), weather.forecast(&city));

            let result = match (current, forecast) {
                (Ok(current), Ok(forecast)) => Ok((current, forecast)),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(city = %city, error = %e, "weather fetch failed");
                    Err(WeatherFailure::classify(&e))
                }
            };

            tx.send(Action::WeatherLoaded {
                screen,
                load_id,
                result,
            })
            .ok();
        });
    }
}
