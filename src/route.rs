use std::fmt;

/// The two logical destinations of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    CityList,
    /// `/weather/<city>`; `None` when the segment is missing or empty
    Weather(Option<String>),
}

impl Route {
    pub fn weather(city: impl Into<String>) -> Self {
        Route::Weather(Some(city.into()))
    }

    /// Parse a route path. The city segment is percent-decoded; a segment that
    /// is not valid UTF-8 after decoding is kept verbatim.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Some(Route::CityList);
        }

        let rest = trimmed.strip_prefix("/weather")?;
        if rest.is_empty() {
            return Some(Route::Weather(None));
        }
        let segment = rest.strip_prefix('/')?;
        if segment.is_empty() {
            return Some(Route::Weather(None));
        }

        let city = urlencoding::decode(segment)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        Some(Route::Weather(Some(city)))
    }

    /// Route path with the city segment percent-encoded
    pub fn path(&self) -> String {
        match self {
            Route::CityList => "/".to_string(),
            Route::Weather(Some(city)) => format!("/weather/{}", urlencoding::encode(city)),
            Route::Weather(None) => "/weather/".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// How the user picked a city in the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Navigate the current view
    Primary,
    /// Open in a new view
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Push the route onto the current view's history
    Push(Route),
    /// Open the route as the root of a new view
    OpenNewView(Route),
}

impl Navigation {
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Push(route) | Navigation::OpenNewView(route) => route,
        }
    }
}

/// Translate a city selection into navigation. The name is passed through
/// as-is; empty or duplicate names are not rejected.
pub fn dispatch(interaction: Interaction, city_name: &str) -> Navigation {
    let route = Route::weather(city_name);
    match interaction {
        Interaction::Primary => Navigation::Push(route),
        Interaction::Secondary => Navigation::OpenNewView(route),
    }
}
