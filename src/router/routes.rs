//! Route dispatch: hash route + session to view descriptor and page title.

use serde::Serialize;
use taggr_api_types::PostId;

use crate::domain::session::SessionUser;

use super::hash::HashRoute;

/// What a route asks the view layer to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewDescriptor {
    Landing,
    Post { id: PostId, version: Option<u64> },
    Thread { id: PostId },
    Reposts { id: PostId },
    NewPost,
    EditPost { id: PostId },
    Realms,
    RealmCreate,
    Realm { name: String },
    Inbox,
    Bookmarks,
    Invites,
    Settings,
    Proposals,
    Tokens,
    TokenTransfer,
    Transaction { id: u64 },
    Journal { handle: String },
    Profile { handle: String },
    Feed { filter: String },
    Search { term: String },
    Dashboard,
    Whitepaper,
    /// Placeholder shown instead of a view that needs a session.
    Unauthorized { requested: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedView {
    pub view: ViewDescriptor,
    pub title: String,
}

impl RoutedView {
    fn new(view: ViewDescriptor, title: impl Into<String>) -> Self {
        Self {
            view,
            title: title.into(),
        }
    }

    fn landing() -> Self {
        Self::new(ViewDescriptor::Landing, "Home")
    }
}

/// Resolve a parsed hash route.
///
/// Unknown segments and malformed numeric parameters fall back to the
/// landing view; session-only views become [`ViewDescriptor::Unauthorized`]
/// for anonymous callers.
pub fn resolve(route: &HashRoute, session: Option<&SessionUser>) -> RoutedView {
    let (resolved, needs_session) = dispatch(route);
    if needs_session && session.is_none() {
        return RoutedView::new(
            ViewDescriptor::Unauthorized {
                requested: route.tag().to_string(),
            },
            "Unauthorized",
        );
    }
    resolved
}

fn dispatch(route: &HashRoute) -> (RoutedView, bool) {
    use ViewDescriptor as V;

    let first = route.param(0);
    let second = route.param(1);

    let numeric = |value: Option<&str>| value.and_then(|raw| raw.parse::<u64>().ok());
    let text = |value: Option<&str>| value.filter(|raw| !raw.is_empty()).map(str::to_string);

    let public = |view: V, title: String| (RoutedView::new(view, title), false);
    let private = |view: V, title: &str| (RoutedView::new(view, title), true);

    match route.head() {
        "post" => match numeric(first) {
            Some(id) => public(
                V::Post {
                    id,
                    version: numeric(second),
                },
                format!("Post #{id}"),
            ),
            None => (RoutedView::landing(), false),
        },
        "thread" => match numeric(first) {
            Some(id) => public(V::Thread { id }, format!("Thread #{id}")),
            None => (RoutedView::landing(), false),
        },
        "reposts" => match numeric(first) {
            Some(id) => public(V::Reposts { id }, format!("Reposts of #{id}")),
            None => (RoutedView::landing(), false),
        },
        "new" => private(V::NewPost, "New post"),
        "edit" => match numeric(first) {
            Some(id) => (RoutedView::new(V::EditPost { id }, format!("Edit #{id}")), true),
            None => (RoutedView::landing(), false),
        },
        "realms" if first == Some("create") => private(V::RealmCreate, "New realm"),
        "realms" => public(V::Realms, "Realms".to_string()),
        "realm" => match text(first) {
            Some(name) => public(V::Realm { name: name.clone() }, format!("Realm {name}")),
            None => (RoutedView::landing(), false),
        },
        "inbox" => private(V::Inbox, "Inbox"),
        "bookmarks" => private(V::Bookmarks, "Bookmarks"),
        "invites" => private(V::Invites, "Invites"),
        "settings" => private(V::Settings, "Settings"),
        "proposals" => public(V::Proposals, "Proposals".to_string()),
        "tokens" if first == Some("transfer") => private(V::TokenTransfer, "Transfer tokens"),
        "tokens" => public(V::Tokens, "Tokens".to_string()),
        "transaction" => match numeric(first) {
            Some(id) => public(V::Transaction { id }, format!("Transaction #{id}")),
            None => (RoutedView::landing(), false),
        },
        "journal" => match text(first) {
            Some(handle) => public(
                V::Journal {
                    handle: handle.clone(),
                },
                format!("{handle}'s journal"),
            ),
            None => (RoutedView::landing(), false),
        },
        "user" => match text(first) {
            Some(handle) => public(
                V::Profile {
                    handle: handle.clone(),
                },
                format!("@{handle}"),
            ),
            None => (RoutedView::landing(), false),
        },
        "feed" => match text(first) {
            Some(filter) => public(
                V::Feed {
                    filter: filter.clone(),
                },
                format!("Feed: {filter}"),
            ),
            None => (RoutedView::landing(), false),
        },
        "search" => match text(first) {
            Some(term) => public(V::Search { term: term.clone() }, format!("Search: {term}")),
            None => (RoutedView::landing(), false),
        },
        "dashboard" | "stats" => public(V::Dashboard, "Dashboard".to_string()),
        "whitepaper" | "about" => public(V::Whitepaper, "Whitepaper".to_string()),
        _ => (RoutedView::landing(), false),
    }
}
