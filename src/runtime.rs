/// Runtimes in display order: the bare-metal baseline, then the two container engines.
pub const KNOWN_RUNTIMES: &[&str] = &["bare", "docker", "podman"];

/// Container engines compared against each other in the memory and scaling charts.
pub const CONTAINER_RUNTIMES: &[&str] = &["docker", "podman"];

const UNKNOWN_PRIORITY: usize = 9;

/// Sort key for a runtime name. Unknown runtimes sort after every known one.
pub fn priority(runtime: &str) -> usize {
    KNOWN_RUNTIMES
        .iter()
        .position(|&known| known == runtime)
        .unwrap_or(UNKNOWN_PRIORITY)
}

/// Stable sort by runtime priority, so unknown runtimes keep their discovery order.
pub fn sort_runtimes<T, F>(items: &mut [T], name: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_key(|item| priority(name(item)));
}
