use crate::detail::WeatherResult;
use crate::error::AppError;
use crate::loader::PageTag;
use crate::route::Interaction;
use crate::types::CityRecord;
use crate::view::Column;

/// Unique id of a screen instance, used to address async results
pub type ScreenId = u64;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Select(Interaction),

    // Views (tabs)
    NextView,
    PrevView,

    // Column headers
    SortBy(Column),
    ToggleFilter(Column),

    // Search
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchPaste(String),
    SearchBackspace,

    // Async results
    CitiesLoaded {
        screen: ScreenId,
        tag: PageTag,
        result: Result<Vec<CityRecord>, String>,
    },
    WeatherLoaded {
        screen: ScreenId,
        load_id: u64,
        result: WeatherResult,
    },

    // Polish
    Refresh,
    OpenInBrowser,
    YankRoute,

    Error(String),
    None,
}

impl From<AppError> for Action {
    fn from(err: AppError) -> Self {
        Action::Error(err.to_string())
    }
}
