use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use taskdeck_core::{AuthFlagStore, AuthGate, PasscodeCheck, AUTH_KEY};

use crate::config::Config;
use crate::state::auth_path;

pub type Gate = AuthGate<PasscodeCheck, FileFlagStore>;

/// Key/value file standing in for browser local storage.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        Ok(serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let s = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, s).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl AuthFlagStore for FileFlagStore {
    type Error = anyhow::Error;

    fn load(&self) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(AUTH_KEY))
    }

    fn save(&self, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(AUTH_KEY.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(AUTH_KEY).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

pub fn open_gate(cfg: &Config) -> Result<Gate> {
    let passcode = cfg.auth.passcode.clone().unwrap_or_default();
    Ok(AuthGate::new(
        PasscodeCheck::new(passcode),
        FileFlagStore::new(auth_path()?),
    ))
}

pub fn require_auth(cfg: &Config) -> Result<()> {
    if !open_gate(cfg)?.is_authenticated() {
        bail!("taskdeck is locked. Run: taskdeck login");
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Entry {
    Typing,
    Done,
    Aborted,
}

/// Applies one key press to a secret being typed.
fn secret_key(buf: &mut String, key: KeyEvent) -> Entry {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Entry::Aborted,
        KeyCode::Esc => Entry::Aborted,
        KeyCode::Enter => Entry::Done,
        KeyCode::Backspace => {
            buf.pop();
            Entry::Typing
        }
        KeyCode::Char(c) => {
            buf.push(c);
            Entry::Typing
        }
        _ => Entry::Typing,
    }
}

fn read_secret() -> Result<Option<String>> {
    let mut buf = String::new();
    loop {
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match secret_key(&mut buf, key) {
            Entry::Typing => {}
            Entry::Done => return Ok(Some(buf)),
            Entry::Aborted => return Ok(None),
        }
    }
}

/// Reads a secret without echoing it. Piped input is read as a plain line.
fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();

    if !io::stdin().is_terminal() {
        let mut s = String::new();
        io::stdin().read_line(&mut s)?;
        return Ok(s.trim().to_string());
    }

    enable_raw_mode()?;
    let typed = read_secret();
    disable_raw_mode()?;
    println!();
    match typed? {
        Some(s) => Ok(s.trim().to_string()),
        None => bail!("login cancelled"),
    }
}

pub fn login(cfg: &Config) -> Result<()> {
    let mut gate = open_gate(cfg)?;
    if gate.is_authenticated() {
        println!("Already logged in.");
        return Ok(());
    }
    if cfg.auth.passcode.as_deref().unwrap_or("").is_empty() {
        bail!("no passcode configured. Set [auth] passcode in ~/.taskdeck/config.toml");
    }
    let attempt = prompt_secret("Passcode")?;
    gate.login(&attempt)?;
    println!("Logged in.");
    Ok(())
}

pub fn logout(cfg: &Config) -> Result<()> {
    open_gate(cfg)?.logout()?;
    println!("Logged out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::AUTH_VALUE;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn secret_entry_edits_and_submits_without_echo() {
        let mut buf = String::new();
        for c in "pax".chars() {
            assert_eq!(secret_key(&mut buf, press(KeyCode::Char(c))), Entry::Typing);
        }
        secret_key(&mut buf, press(KeyCode::Backspace));
        secret_key(&mut buf, press(KeyCode::Char('s')));
        assert_eq!(secret_key(&mut buf, press(KeyCode::Enter)), Entry::Done);
        assert_eq!(buf, "pas");
    }

    #[test]
    fn secret_entry_can_be_aborted() {
        let mut buf = String::from("half");
        assert_eq!(secret_key(&mut buf, press(KeyCode::Esc)), Entry::Aborted);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(secret_key(&mut buf, ctrl_c), Entry::Aborted);
        assert_eq!(buf, "half");
    }

    #[test]
    fn flag_survives_in_file_next_to_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let flags = FileFlagStore::new(&path);
        assert_eq!(flags.load().unwrap(), None);

        let mut gate = AuthGate::new(PasscodeCheck::new("pw"), flags.clone());
        gate.login("pw").unwrap();
        assert_eq!(flags.load().unwrap().as_deref(), Some(AUTH_VALUE));

        // A fresh gate over the same file starts authenticated.
        let gate2 = AuthGate::new(PasscodeCheck::new("pw"), FileFlagStore::new(&path));
        assert!(gate2.is_authenticated());

        gate.logout().unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains(AUTH_KEY));
    }
}
