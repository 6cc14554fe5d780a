use crate::secur::Secur;

/// Reports what is stored locally. Never calls the identity service.
#[must_use]
pub fn handle(secur: &Secur) -> Vec<String> {
    let store = secur.store();
    let credential = if store.credential().is_some() {
        "present"
    } else {
        "absent"
    };

    let mut lines = vec![format!("credential: {credential}")];
    match store.cached_member() {
        Some(cached) => {
            let freshness = if store.is_fresh(&cached) {
                "fresh"
            } else {
                "stale"
            };
            let member = cached.into_member();
            lines.push(format!("member: {} ({})", member.username, member.id));
            lines.push(format!("cache: {freshness}"));
        }
        None => lines.push("member: none".to_string()),
    }
    lines
}
