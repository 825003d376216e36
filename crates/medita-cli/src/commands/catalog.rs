use medita_core::theme;
use medita_core::timer::display::format_remaining;
use medita_core::{Config, Preset};

pub fn presets() -> Result<(), Box<dyn std::error::Error>> {
    let default_minutes = Config::load()?.timer.default_minutes;
    for preset in Preset::ALL {
        let marker = if preset.minutes() == default_minutes { "*" } else { " " };
        println!(
            "{marker} {:>2} min  {}",
            preset.minutes(),
            format_remaining(preset.duration_ms())
        );
    }
    Ok(())
}

pub fn themes(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let selected = Config::load()?.ui.theme;
    if json {
        println!("{}", serde_json::to_string_pretty(theme::catalog())?);
        return Ok(());
    }
    for t in theme::catalog() {
        let marker = if t.id == selected { "*" } else { " " };
        println!(
            "{marker} {:<11} {:<14} accent {}  gradient {} -> {}",
            t.title, t.subtitle, t.accent, t.gradient[0], t.gradient[1]
        );
    }
    Ok(())
}
