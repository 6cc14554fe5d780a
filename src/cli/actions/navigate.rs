use crate::cli::router::ConsoleRouter;
use crate::secur::{Location, Outcome, Route, Secur, ACCESS_TOKEN_QUERY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub to: String,
    pub from: Option<String>,
    pub requires_auth: bool,
    pub from_requires_auth: bool,
}

impl Args {
    fn routes(&self) -> (Route, Option<Route>) {
        let to = Route {
            location: Location::parse(&self.to),
            requires_auth: self.requires_auth,
        };
        let from = self.from.as_deref().map(|from| Route {
            location: Location::parse(from),
            requires_auth: self.from_requires_auth,
        });
        (to, from)
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Authenticated(member) => {
            format!("authenticated as {} ({})", member.username, member.id)
        }
        Outcome::Rejected {
            error,
            redirect: Some(redirect),
        } => format!("rejected: {error}, redirecting to {redirect}"),
        Outcome::Rejected {
            error,
            redirect: None,
        } => format!("rejected: {error}"),
        Outcome::Superseded => "superseded by a later navigation".to_string(),
    }
}

/// Runs one guarded navigation and reports the router visits and the
/// outcome, in the order they happened.
pub async fn handle(secur: &Secur, router: &ConsoleRouter, args: &Args) -> Vec<String> {
    let (to, from) = args.routes();

    let outcome = secur
        .guard()
        .before_each(&to, from.as_ref(), || {
            tracing::debug!(to = %to.location, "navigation proceeds");
        })
        .await;

    let mut entered = to.location.clone();
    entered.query.remove(ACCESS_TOKEN_QUERY);

    let mut lines = vec![format!("proceed {entered}")];
    lines.extend(router.visits().iter().map(|visit| visit.describe()));
    lines.push(describe(&outcome));
    lines.push(format!("ready: {}", secur.state().is_ready()));
    lines
}
