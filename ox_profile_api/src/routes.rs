use std::fmt;

use log::debug;

use crate::session::SessionManager;

/// Screens of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Records,
    Dashboard(i64),
    Edit(i64),
    UpdatePassword(i64),
    ForgotPassword,
}

impl Route {
    /// Unknown paths land on the login screen.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();
        let id = |raw: &String| raw.parse::<i64>().ok();

        let route = match segments.as_slice() {
            [] => Some(Route::Login),
            [only] => match only.as_str() {
                "login" => Some(Route::Login),
                "register" => Some(Route::Register),
                "home-page" | "home" => Some(Route::Home),
                "cards" | "records" => Some(Route::Records),
                "forgot-password" => Some(Route::ForgotPassword),
                _ => None,
            },
            [screen, raw] => match screen.as_str() {
                "dashboard" => id(raw).map(Route::Dashboard),
                "edit" => id(raw).map(Route::Edit),
                "update-password" => id(raw).map(Route::UpdatePassword),
                _ => None,
            },
            _ => None,
        };
        route.unwrap_or_else(|| {
            debug!("No route for {:?}, redirecting to login", path);
            Route::Login
        })
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::Home => "/Home-Page".to_string(),
            Route::Records => "/cards".to_string(),
            Route::Dashboard(id) => format!("/dashboard/{}", id),
            Route::Edit(id) => format!("/edit/{}", id),
            Route::UpdatePassword(id) => format!("/Update-password/{}", id),
            Route::ForgotPassword => "/forgot-password".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Records | Route::Dashboard(_) | Route::Edit(_) | Route::UpdatePassword(_)
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decides whether navigation to a route is allowed; `Some` is the redirect.
pub trait Guard {
    fn check(&self, route: &Route, session: &SessionManager) -> Option<Route>;
}

/// Sends unauthenticated users to login.
pub struct AuthGuard;

impl Guard for AuthGuard {
    fn check(&self, route: &Route, session: &SessionManager) -> Option<Route> {
        if route.requires_auth() && !session.is_authenticated() {
            Some(Route::Login)
        } else {
            None
        }
    }
}

/// Sends users who are already logged in from the login screens to home.
pub struct LoginGuard;

impl Guard for LoginGuard {
    fn check(&self, route: &Route, session: &SessionManager) -> Option<Route> {
        if matches!(route, Route::Login | Route::Register) && session.is_authenticated() {
            Some(Route::Home)
        } else {
            None
        }
    }
}

/// Final destination after both guards have had their say.
pub fn resolve(route: Route, session: &SessionManager) -> Route {
    let guards: [&dyn Guard; 2] = [&AuthGuard, &LoginGuard];
    for guard in guards {
        if let Some(redirect) = guard.check(&route, session) {
            debug!("Redirecting {} to {}", route, redirect);
            return redirect;
        }
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("/Home-Page"), Route::Home);
        assert_eq!(Route::parse("/dashboard/4"), Route::Dashboard(4));
        assert_eq!(Route::parse("/edit/x"), Route::Login);
        assert_eq!(Route::parse("/nowhere/at/all"), Route::Login);
        assert_eq!(Route::parse(&Route::UpdatePassword(2).path()), Route::UpdatePassword(2));
    }

    #[test]
    fn test_guards() {
        let session = SessionManager::in_memory();
        assert_eq!(resolve(Route::Records, &session), Route::Login);
        assert_eq!(resolve(Route::ForgotPassword, &session), Route::ForgotPassword);
        assert_eq!(resolve(Route::Login, &session), Route::Login);

        session.establish("tok", 1, "asha").unwrap();
        assert_eq!(resolve(Route::Login, &session), Route::Home);
        assert_eq!(resolve(Route::Edit(1), &session), Route::Edit(1));
    }
}
