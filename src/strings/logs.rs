use std::time::Duration;

pub const POLL_LOOP_START: &str = "Starting poll loop...";
pub const SHUTDOWN: &str = "Shutting down poll loop...";

pub fn source_added(name: &str, rules: usize) -> String {
    format!("Watching /r/{name} with {rules} reaction(s)")
}

pub fn source_removed(name: &str) -> String {
    format!("Stopped watching /r/{name}")
}

pub fn reactions_loaded(name: &str, rules: usize, ignored: usize) -> String {
    format!("Loaded {rules} reaction(s) for /r/{name} ({ignored} ignored)")
}

pub fn stream_primed(name: &str, category: &str, seen: usize) -> String {
    format!("Primed {category} stream of /r/{name} with {seen} existing item(s)")
}

pub fn fetch_failed(name: &str, category: &str, err: &str) -> String {
    format!("Failed to fetch {category} from /r/{name}: {err}")
}

pub fn handler_failed(category: &str, item_id: &str, err: &str) -> String {
    format!("Handler for {category} failed on item {item_id}: {err}")
}

pub fn presence_failed(err: &str) -> String {
    format!("Failed to change bot presence: {err}")
}

pub fn author_failed(item_id: &str, err: &str) -> String {
    format!("Failed to resolve author of {item_id}: {err}")
}

pub fn action_failed(action: &str, item_id: &str, err: &str) -> String {
    format!("Failed to {action} {item_id}: {err}")
}

pub fn reaction_applied(emoji: &str, item_id: &str, actions: &[String]) -> String {
    format!("Reaction {emoji} on {item_id}: {}", actions.join(", "))
}

pub fn lookup_failed(url: &str, err: &str) -> String {
    format!("Failed to look up {url}: {err}")
}

pub fn tick_finished(items: usize, failed: usize, wait: Duration) -> String {
    format!(
        "Poll finished: {items} new item(s), {failed} failed stream(s), next poll in {}s",
        wait.as_secs()
    )
}
