use slsparcel_plugin::{LifecycleHook, Phase};

/// One line per registered hook: event name and the phase it drives.
pub fn describe() -> Vec<String> {
    LifecycleHook::ALL
        .iter()
        .map(|hook| {
            let phase = match hook.phase() {
                Phase::Bundle => "bundle",
                Phase::Cleanup => "cleanup",
            };
            format!("{:<45} {}", hook.event_name(), phase)
        })
        .collect()
}
