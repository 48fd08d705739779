//! Route table and authentication guard.

use crate::{auth::Session, employees::EmployeeId};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A screen of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Employees,
    NewEmployee,
    EditEmployee(EmployeeId),
    FormBuilder,
    ChangePassword,
    Profile,
}

impl Route {
    /// Whether the route can be shown without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Employees => "/employees".to_string(),
            Route::NewEmployee => "/employees/new".to_string(),
            Route::EditEmployee(id) => format!("/employees/{id}/edit"),
            Route::FormBuilder => "/form-builder".to_string(),
            Route::ChangePassword => "/change-password".to_string(),
            Route::Profile => "/profile".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign In",
            Route::Register => "Create Account",
            Route::Dashboard => "Dashboard",
            Route::Employees => "Employees",
            Route::NewEmployee => "New Employee",
            Route::EditEmployee(_) => "Edit Employee",
            Route::FormBuilder => "Form Builder",
            Route::ChangePassword => "Change Password",
            Route::Profile => "Profile",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No route for '{0}'")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        let route = match trimmed {
            "" => Route::Dashboard,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/employees" => Route::Employees,
            "/employees/new" => Route::NewEmployee,
            "/form-builder" => Route::FormBuilder,
            "/change-password" => Route::ChangePassword,
            "/profile" => Route::Profile,
            other => other
                .strip_prefix("/employees/")
                .and_then(|rest| rest.strip_suffix("/edit"))
                .and_then(|id| id.parse().ok())
                .map(Route::EditEmployee)
                .ok_or_else(|| UnknownRoute(s.to_string()))?,
        };
        Ok(route)
    }
}

/// What to do with a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show the requested route
    Render(Route),
    /// Show this route instead
    Redirect(Route),
}

impl RouteDecision {
    /// The route that ends up on screen.
    pub fn target(&self) -> Route {
        match self {
            RouteDecision::Render(route) | RouteDecision::Redirect(route) => *route,
        }
    }
}

/// Gate protected routes on the session's authenticated flag.
pub fn guard(route: Route, session: &Session) -> RouteDecision {
    if route.is_public() || session.is_authenticated {
        RouteDecision::Render(route)
    } else {
        RouteDecision::Redirect(Route::Login)
    }
}
