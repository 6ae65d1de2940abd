use serde::Serialize;

pub const DASHBOARD_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// The route table of the application. Anything unknown lands on `PageNotFound`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    CustomerLogin,
    CustomerRegister,
    PageNotFound,
}

impl Route {
    /// Matches a path against the table. Query strings, fragments and a trailing
    /// slash are ignored.
    pub fn resolve(path: &str) -> Route {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Dashboard,
            LOGIN_PATH => Route::CustomerLogin,
            REGISTER_PATH => Route::CustomerRegister,
            _ => Route::PageNotFound,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::CustomerLogin => "CustomerLogin",
            Route::CustomerRegister => "CustomerRegister",
            Route::PageNotFound => "PageNotFound",
        }
    }

    /// Routes that go through the auth guard before being entered.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}
