use folio_types::config::{SeedFile, TerminalConfig};

const HOME: &str = "/home/visitor";

/// Default configuration with a small demo portfolio.
pub fn config() -> TerminalConfig {
    TerminalConfig {
        home_path: HOME.to_string(),
        files: seeds(),
        ..TerminalConfig::default()
    }
}

fn seeds() -> Vec<SeedFile> {
    vec![
        SeedFile::file(
            "/home/visitor/readme.txt",
            "Welcome to folio!\nType 'help' for available commands.",
        ),
        SeedFile::file(
            "/home/visitor/about.md",
            "# About\nSystems programmer. Likes parsers, games, and small tools.",
        )
        .with_section("about"),
        SeedFile::file("/home/visitor/contact.txt", "mail: visitor@example.com")
            .with_section("contact"),
        SeedFile::file(
            "/home/visitor/projects/terminal.md",
            "# Terminal\nThe shell you are typing into.",
        )
        .with_section("projects"),
        SeedFile::file(
            "/home/visitor/projects/chess.md",
            "# Chess\nA bot that searches two plies deep.",
        ),
        SeedFile::file("/home/visitor/pictures/cat.png", " /\\_/\\\n( o.o )\n > ^ <"),
        SeedFile::file("/home/visitor/music/theme.mp3", ""),
        SeedFile::file("/home/visitor/.profile", "export EDITOR=nano"),
        script("hello_world.py", "Hello world demo.", "echo hello, $USER"),
        script("snake.py", "Turn-based Snake game.", "snake"),
        script("pong.py", "Pong against a computer paddle.", "pong"),
        script("pacman.py", "Pac-Man with three ghosts.", "pacman"),
        script("chess.py", "Chess against a simple bot.", "chess"),
        SeedFile::dir("/tmp"),
        SeedFile::file("/etc/hostname", "folio"),
    ]
}

/// A demo script under `~/scripts` naming the command that runs it.
fn script(name: &str, summary: &str, command: &str) -> SeedFile {
    let content = format!("\"\"\"{summary}\"\"\"\n\n# run with: {command}");
    SeedFile::file(&format!("{HOME}/scripts/{name}"), &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_terminal::Engine;

    #[test]
    fn demo_config_is_valid() {
        let cfg = config();
        cfg.validate().unwrap();
        assert!(cfg.files.iter().all(|f| f.path.starts_with('/')));
        assert!(cfg.files.iter().any(|f| f.section.as_deref() == Some("contact")));
    }

    #[test]
    fn scripts_are_browsable() {
        let mut engine = Engine::new(config());
        engine.launch("ls scripts");
        let lines = engine.lines();
        let listing = &lines[lines.len() - 2];
        for name in ["chess.py", "hello_world.py", "pacman.py", "pong.py", "snake.py"] {
            assert!(listing.contains(name), "{name} missing from {listing:?}");
        }
        engine.launch("grep -r 'run with*' ~/scripts");
        let hits = engine.lines().iter().filter(|l| l.contains("# run with: ")).count();
        assert_eq!(hits, 5);
        engine.launch("cat ~/scripts/snake.py");
        let lines = engine.lines();
        assert_eq!(lines[lines.len() - 2], "# run with: snake");
    }
}
