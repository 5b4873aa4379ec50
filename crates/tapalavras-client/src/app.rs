use std::io;

use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use tapalavras_client::session::RoomEntry;

use crate::event::{self, AppEvent};
use crate::input::{self, Action};
use crate::ui::home::HomeScreen;
use crate::ui::room::RoomScreen;

#[derive(Debug)]
pub enum Screen {
    Home(HomeScreen),
    Room(RoomScreen),
}

/// Startup options taken from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: String,
    pub name: Option<String>,
    pub room: Option<String>,
    pub host: bool,
    pub debug: bool,
}

impl Config {
    /// A room entry to open straight away, when both a name and a room (or
    /// `--host`) were given.
    fn initial_entry(&self) -> Option<RoomEntry> {
        let player_name = self.name.clone().filter(|n| !n.trim().is_empty())?;
        match (&self.room, self.host) {
            (Some(room), host) => Some(RoomEntry {
                room_code: room.clone(),
                player_name,
                host,
            }),
            (None, true) => Some(RoomEntry {
                room_code: tapalavras_common::room_code::generate_room_code(
                    &mut rand::thread_rng(),
                ),
                player_name,
                host: true,
            }),
            (None, false) => None,
        }
    }
}

pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
) -> anyhow::Result<()> {
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(64);
    let input_handle = tokio::spawn(event::event_loop(event_tx.clone()));

    // Every room screen gets a fresh generation; events from older ones are dropped
    let mut generation: u64 = 0;

    let mut screen = match config.initial_entry() {
        Some(entry) => {
            generation += 1;
            Screen::Room(
                RoomScreen::open(entry, &config.server, generation, event_tx.clone(), config.debug)
                    .await,
            )
        }
        None => Screen::Home(HomeScreen::new(config.name.clone())),
    };

    let mut running = true;
    while running {
        terminal.draw(|frame| match &screen {
            Screen::Home(s) => s.draw(frame),
            Screen::Room(s) => s.draw(frame),
        })?;

        let event = match event_rx.recv().await {
            Some(e) => e,
            None => break,
        };

        let action = match event {
            AppEvent::Key(key) => {
                // Any key closes the help popup
                if let Screen::Room(s) = &mut screen {
                    if s.show_help {
                        s.show_help = false;
                        continue;
                    }
                }
                input::map_key(key, &screen)
            }
            AppEvent::Network { session, inbound } => {
                match &mut screen {
                    Screen::Room(s) if s.generation == session => s.apply(&inbound),
                    _ => tracing::trace!("Dropping event from stale session {}", session),
                }
                None
            }
            AppEvent::Tick | AppEvent::Countdown => None,
        };

        let Some(action) = action else {
            continue;
        };

        match action {
            Action::Quit => running = false,
            Action::ShowHelp => {
                if let Screen::Room(s) = &mut screen {
                    s.show_help = true;
                }
            }

            Action::TypeChar(c) => match &mut screen {
                Screen::Home(s) => s.type_char(c),
                Screen::Room(s) => s.type_char(c),
            },
            Action::Backspace => match &mut screen {
                Screen::Home(s) => s.backspace(),
                Screen::Room(s) => s.backspace(),
            },
            Action::SwitchField => {
                if let Screen::Home(s) = &mut screen {
                    s.switch_field();
                }
            }
            Action::Submit => {
                if let Screen::Home(s) = &mut screen {
                    if let Some(entry) = s.submit() {
                        tracing::info!(
                            "Entering room {} as {} (host: {})",
                            entry.room_code,
                            entry.player_name,
                            entry.host
                        );
                        generation += 1;
                        screen = Screen::Room(
                            RoomScreen::open(
                                entry,
                                &config.server,
                                generation,
                                event_tx.clone(),
                                config.debug,
                            )
                            .await,
                        );
                    }
                }
            }

            Action::SelectLetter(c) => {
                if let Screen::Room(s) = &mut screen {
                    s.select_letter(c);
                }
            }
            Action::PassTurn => {
                if let Screen::Room(s) = &mut screen {
                    s.pass_turn();
                }
            }
            Action::FocusTheme => {
                if let Screen::Room(s) = &mut screen {
                    s.toggle_theme_focus();
                }
            }
            Action::StartGame => {
                if let Screen::Room(s) = &mut screen {
                    s.start_game();
                }
            }
            Action::ClearDebug => {
                if let Screen::Room(s) = &mut screen {
                    s.clear_debug();
                }
            }
            Action::LeaveRoom => {
                if let Screen::Room(s) = &screen {
                    tracing::info!("Leaving room {}", s.entry.room_code);
                    let name = Some(s.entry.player_name.clone());
                    // Dropping the room screen closes its connection
                    screen = Screen::Home(HomeScreen::new(name));
                }
            }
        }
    }

    input_handle.abort();
    Ok(())
}
