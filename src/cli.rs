use std::io::{self, BufRead, Write};

use tracing::{info, warn};

use crate::ai::prompts::{chat_request, sanitize_short};
use crate::ai::{AiService, FALLBACK_MESSAGE};
use crate::navigation::Props;
use crate::role::Role;
use crate::search::search;
use crate::session::Session;
use crate::shell::{dashboard_for, Dashboard};
use crate::store::StoreHandle;

const HELP: &str = "Commands:
  login <admin|teacher|parent|student>
  open <view> [title words] [key=value ...]
  back
  tab <id>
  where
  tabs
  search <query>
  ask <prompt>
  logout
  help
  exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct CliShell {
    store: StoreHandle,
    ai: AiService,
    signed_in: Option<(Session, Box<dyn Dashboard>)>,
}

impl CliShell {
    pub fn new(store: StoreHandle, ai: AiService) -> Self {
        Self {
            store,
            ai,
            signed_in: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.signed_in.as_ref().map(|(s, _)| s)
    }

    pub fn dashboard(&self) -> Option<&dyn Dashboard> {
        self.signed_in.as_ref().map(|(_, d)| d.as_ref())
    }

    pub fn login(&mut self, role: Role) -> &Session {
        let session = Session::login(&self.store.read(), role);
        let dashboard = dashboard_for(role);
        let (session, _) = self.signed_in.insert((session, dashboard));
        session
    }

    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "exit" | "quit" => {
                writeln!(out, "Goodbye")?;
                return Ok(Flow::Exit);
            }
            "help" => writeln!(out, "{HELP}")?,
            "login" => match Role::parse(rest) {
                Some(role) => {
                    let name = self.login(role).display_name.clone();
                    writeln!(out, "Signed in as {name} ({role}).")?;
                    self.print_where(out)?;
                }
                None => writeln!(out, "Usage: login <admin|teacher|parent|student>")?,
            },
            "logout" => match self.signed_in.take() {
                Some((session, _)) => {
                    info!(role = %session.role, "signed out");
                    writeln!(out, "Signed out.")?;
                }
                None => writeln!(out, "Not signed in.")?,
            },
            "search" if rest.is_empty() => writeln!(out, "Usage: search <query>")?,
            "ask" if rest.is_empty() => writeln!(out, "Usage: ask <prompt>")?,
            "ask" => {
                let answer = match self.ai.generate_blocking(chat_request(rest)) {
                    Ok(output) => sanitize_short(&output.into_text(), 4, 400),
                    Err(e) => {
                        warn!(error = %e, "cli ask failed");
                        FALLBACK_MESSAGE.to_string()
                    }
                };
                writeln!(out, "Assistant: {answer}")?;
            }
            other => {
                let Some((session, dashboard)) = self.signed_in.as_mut() else {
                    writeln!(out, "Not signed in. Try: login teacher")?;
                    return Ok(Flow::Continue);
                };
                match other {
                    "open" => {
                        let mut words = rest.split_whitespace();
                        let Some(view) = words.next() else {
                            writeln!(out, "Usage: open <view> [title words] [key=value ...]")?;
                            return Ok(Flow::Continue);
                        };
                        let (pairs, title_words): (Vec<&str>, Vec<&str>) =
                            words.partition(|w| w.contains('='));
                        let title = if title_words.is_empty() {
                            view.to_string()
                        } else {
                            title_words.join(" ")
                        };
                        dashboard.navigate_to(view, &title, Props::from_pairs(pairs));
                        self.print_where(out)?;
                    }
                    "back" => {
                        dashboard.handle_back();
                        self.print_where(out)?;
                    }
                    "tab" => {
                        if dashboard.select_tab(rest) {
                            self.print_where(out)?;
                        } else {
                            writeln!(out, "No tab named '{rest}'. Try: tabs")?;
                        }
                    }
                    "tabs" => {
                        let active = dashboard.active_tab();
                        for tab in dashboard.tabs() {
                            let marker = if tab.id == active { "*" } else { " " };
                            writeln!(out, "{marker} {:<14} {}", tab.id, tab.label)?;
                        }
                    }
                    "where" => self.print_where(out)?,
                    "search" => {
                        let hits = search(&self.store.read(), session.role, &session.user_id, rest);
                        if hits.is_empty() {
                            writeln!(out, "No results for '{rest}'.")?;
                        }
                        for hit in hits {
                            let props: Vec<String> = hit
                                .frame
                                .props
                                .iter()
                                .map(|(k, v)| format!("{k}={}", v.as_str().unwrap_or_default()))
                                .collect();
                            writeln!(
                                out,
                                "{} ({})  -> open {} {} {}",
                                hit.label,
                                hit.detail,
                                hit.frame.view,
                                hit.frame.title,
                                props.join(" ")
                            )?;
                        }
                    }
                    _ => writeln!(out, "Unknown command '{other}'. Type 'help'.")?,
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn print_where(&self, out: &mut impl Write) -> io::Result<()> {
        let Some((_, dashboard)) = self.signed_in.as_ref() else {
            return writeln!(out, "Not signed in.");
        };
        let frame = dashboard.current();
        writeln!(
            out,
            "[{}] {} ({}) depth {} mode {:?}",
            dashboard.role(),
            frame.title,
            frame.view,
            dashboard.depth(),
            dashboard.mode()
        )?;
        if let Err(placeholder) = dashboard.resolve_label() {
            writeln!(out, "{placeholder}")?;
        }
        Ok(())
    }
}

pub fn run_cli(store: StoreHandle, ai: AiService, initial_role: Option<Role>) -> io::Result<()> {
    let mut shell = CliShell::new(store, ai);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "SchoolHub CLI. Type 'help' for commands, 'exit' to quit.")?;
    if let Some(role) = initial_role {
        shell.execute(&format!("login {}", role.as_str()), &mut out)?;
    }

    let stdin = io::stdin();
    loop {
        let prompt = shell
            .session()
            .map(|s| s.role.as_str())
            .unwrap_or("signed-out");
        write!(out, "{prompt}> ")?;
        out.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if shell.execute(&line, &mut out)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::task::tests::service;
    use crate::fixtures;

    fn shell(reply: Option<&str>) -> CliShell {
        CliShell::new(StoreHandle::new(fixtures::seed()), service(reply))
    }

    fn run(shell: &mut CliShell, line: &str) -> String {
        let mut out = Vec::new();
        shell.execute(line, &mut out).expect("write to vec");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn commands_need_a_session() {
        let mut cli = shell(None);
        assert!(run(&mut cli, "where").contains("Not signed in"));
        assert!(run(&mut cli, "back").contains("Not signed in"));
    }

    #[test]
    fn open_back_and_tab_drive_the_stack() {
        let mut cli = shell(None);
        let out = run(&mut cli, "login teacher");
        assert!(out.contains("Ms. Amara Diallo"));
        assert!(out.contains("Teacher Dashboard (overview) depth 1"));

        let out = run(&mut cli, "open classDetail Class 10A classId=10A");
        assert!(out.contains("Class 10A (classDetail) depth 2 mode Detail"));
        let dashboard = cli.dashboard().expect("dashboard");
        assert_eq!(dashboard.current().props.get_str("classId"), Some("10A"));

        run(&mut cli, "open gradebook");
        assert_eq!(cli.dashboard().map(|d| d.depth()), Some(3));
        run(&mut cli, "back");
        assert_eq!(cli.dashboard().map(|d| d.depth()), Some(2));

        let out = run(&mut cli, "tab messages");
        assert!(out.contains("(messages) depth 1"));
        assert!(run(&mut cli, "tab nowhere").contains("No tab named"));
    }

    #[test]
    fn back_at_root_stays_put() {
        let mut cli = shell(None);
        run(&mut cli, "login student");
        let out = run(&mut cli, "back");
        assert!(out.contains("depth 1 mode Home"));
    }

    #[test]
    fn unknown_view_prints_placeholder() {
        let mut cli = shell(None);
        run(&mut cli, "login parent");
        let out = run(&mut cli, "open gradebook");
        assert!(out.contains("View not found: gradebook"));
    }

    #[test]
    fn logout_discards_the_stack() {
        let mut cli = shell(None);
        run(&mut cli, "login admin");
        run(&mut cli, "open students Students");
        assert!(run(&mut cli, "logout").contains("Signed out"));
        assert!(cli.dashboard().is_none());

        run(&mut cli, "login admin");
        assert_eq!(cli.dashboard().map(|d| d.depth()), Some(1));
    }

    #[test]
    fn search_lists_openable_frames() {
        let mut cli = shell(None);
        run(&mut cli, "login admin");
        let out = run(&mut cli, "search noah");
        assert!(out.contains("open studentDetail Noah Patel studentId=s-3"));
        assert!(run(&mut cli, "search zzz").contains("No results"));
    }

    #[test]
    fn ask_falls_back_on_failure() {
        let mut cli = shell(None);
        let out = run(&mut cli, "ask what is homework?");
        assert!(out.contains(FALLBACK_MESSAGE));

        let mut cli = shell(Some("Homework is practice."));
        assert!(run(&mut cli, "ask what is homework?").contains("Homework is practice."));
    }

    #[test]
    fn exit_ends_the_loop() {
        let mut cli = shell(None);
        let mut out = Vec::new();
        assert_eq!(cli.execute("exit", &mut out).expect("io"), Flow::Exit);
    }
}
