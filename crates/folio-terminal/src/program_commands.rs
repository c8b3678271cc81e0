//! Page navigation and program launchers: open, show, nano, view, music,
//! snake, pong, chess, pacman.

use folio_programs::{LaunchArgs, ProgramKind};
use folio_types::error::Result;
use folio_vfs::path::file_name;

use crate::interpreter::{Command, CommandOutput, Environment};

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp"];
const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "ogg", "flac", "m4a"];

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// open
// ---------------------------------------------------------------------------

struct OpenCmd;
impl Command for OpenCmd {
    fn name(&self) -> &str {
        "open"
    }
    fn description(&self) -> &str {
        "Open a file in the page or a viewer"
    }
    fn usage(&self) -> &str {
        "open <file>"
    }
    fn category(&self) -> &str {
        "navigation"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let &[target] = args else {
            return Err(env.usage_error(self.usage()));
        };
        let Some(entry) = env.vfs.get_node(target) else {
            return Err(env.error(&env.messages.file_not_found, &[("file", target)]));
        };
        if let Some(section) = entry.section() {
            return Ok(CommandOutput::Navigate {
                section: section.to_string(),
            });
        }
        let Some(content) = entry.content() else {
            return Err(env.error(&env.messages.is_a_directory, &[("path", target)]));
        };

        let name = entry.name();
        let kind = match extension(name) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => ProgramKind::Viewer,
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => ProgramKind::Music,
            _ => return Ok(CommandOutput::Text(content.to_string())),
        };
        Ok(CommandOutput::Launch {
            kind,
            args: LaunchArgs {
                title: Some(name.to_string()),
                content: Some(content.to_string()).filter(|c| !c.is_empty()),
                ..LaunchArgs::default()
            },
        })
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

struct ShowCmd;
impl Command for ShowCmd {
    fn name(&self) -> &str {
        "show"
    }
    fn description(&self) -> &str {
        "Scroll the page to a section"
    }
    fn usage(&self) -> &str {
        "show <section|file>"
    }
    fn category(&self) -> &str {
        "navigation"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let &[target] = args else {
            return Err(env.usage_error(self.usage()));
        };
        if let Some(section) = env.vfs.get_node(target).and_then(|e| e.section()) {
            return Ok(CommandOutput::Navigate {
                section: section.to_string(),
            });
        }
        let mut known = false;
        env.vfs.walk_with("/", |item| {
            known |= item.entry.section() == Some(target);
        });
        if known {
            Ok(CommandOutput::Navigate {
                section: target.to_string(),
            })
        } else {
            Err(env.error(&env.messages.no_such_section, &[("section", target)]))
        }
    }
}

// ---------------------------------------------------------------------------
// program launchers
// ---------------------------------------------------------------------------

struct ProgramCmd {
    kind: ProgramKind,
}

impl ProgramCmd {
    /// Parse `--seed N` and, for chess, `--two-player`.
    fn game_args(&self, args: &[&str], env: &Environment<'_>) -> Result<LaunchArgs> {
        let mut launch = LaunchArgs::default();
        let mut rest = args.iter();
        while let Some(&arg) = rest.next() {
            match arg {
                "--seed" => {
                    let seed = rest.next().and_then(|s| s.parse().ok());
                    if seed.is_none() {
                        return Err(env.usage_error(self.usage()));
                    }
                    launch.seed = seed;
                },
                "--two-player" if self.kind == ProgramKind::Chess => launch.bot = false,
                _ => return Err(env.usage_error(self.usage())),
            }
        }
        Ok(launch)
    }

    /// Title and text of an optional file argument.
    fn file_args(&self, args: &[&str], env: &Environment<'_>) -> Result<LaunchArgs> {
        let target = match args {
            [] => return Ok(LaunchArgs::default()),
            [target] => *target,
            _ => return Err(env.usage_error(self.usage())),
        };
        let title = Some(file_name(&env.vfs.resolve_path(target)).to_string());
        match env.vfs.get_node(target) {
            Some(entry) => match entry.content() {
                Some(text) => Ok(LaunchArgs {
                    title,
                    content: Some(text.to_string()),
                    ..LaunchArgs::default()
                }),
                None => Err(env.error(&env.messages.is_a_directory, &[("path", target)])),
            },
            // Nano starts a new document; the viewer needs an existing file.
            None if self.kind == ProgramKind::Viewer => {
                Err(env.error(&env.messages.file_not_found, &[("file", target)]))
            },
            None => Ok(LaunchArgs {
                title,
                ..LaunchArgs::default()
            }),
        }
    }
}

impl Command for ProgramCmd {
    fn name(&self) -> &str {
        self.kind.command()
    }
    fn description(&self) -> &str {
        match self.kind {
            ProgramKind::Nano => "Edit a text file",
            ProgramKind::Viewer => "View an image",
            ProgramKind::Music => "Open the music player",
            ProgramKind::Snake => "Play snake",
            ProgramKind::Pong => "Play pong against the computer",
            ProgramKind::Chess => "Play chess",
            ProgramKind::Pacman => "Play pac-man",
        }
    }
    fn usage(&self) -> &str {
        match self.kind {
            ProgramKind::Nano => "nano [file]",
            ProgramKind::Viewer => "view [file]",
            ProgramKind::Music => "music [track]",
            ProgramKind::Snake => "snake [--seed N]",
            ProgramKind::Pong => "pong [--seed N]",
            ProgramKind::Chess => "chess [--two-player] [--seed N]",
            ProgramKind::Pacman => "pacman [--seed N]",
        }
    }
    fn category(&self) -> &str {
        "programs"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let launch = match self.kind {
            ProgramKind::Nano | ProgramKind::Viewer => self.file_args(args, env)?,
            ProgramKind::Music => match args {
                [] => LaunchArgs::default(),
                [track] => LaunchArgs {
                    title: Some(file_name(&env.vfs.resolve_path(track)).to_string()),
                    ..LaunchArgs::default()
                },
                _ => return Err(env.usage_error(self.usage())),
            },
            ProgramKind::Snake | ProgramKind::Pong | ProgramKind::Chess | ProgramKind::Pacman => {
                self.game_args(args, env)?
            },
        };
        Ok(CommandOutput::Launch {
            kind: self.kind,
            args: launch,
        })
    }
}

/// Register navigation commands and one launcher per program.
pub fn register_program_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(OpenCmd));
    reg.register(Box::new(ShowCmd));
    for kind in ProgramKind::ALL {
        reg.register(Box::new(ProgramCmd { kind }));
    }
}
