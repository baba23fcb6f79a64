//! Push-to-talk hotkey events.
//!
//! The session controller is driven by an injectable [`HotkeyDispatcher`]
//! so it can be tested with synthetic press/release sequences instead of
//! real OS key hooks. The real backend registers a single global hotkey
//! and reports its press and release transitions; key auto-repeat is
//! filtered by the hotkey library, not here.

use std::collections::VecDeque;

#[cfg(feature = "hotkeys")]
use crate::error::{HoldtypeError, Result};
#[cfg(feature = "hotkeys")]
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};

/// A physical transition of the record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed,
    Released,
}

/// Source of record-key events.
pub trait HotkeyDispatcher {
    /// Block until the next press/release of the record key.
    ///
    /// Returns `None` when the event source is exhausted or shut down;
    /// the controller loop ends then.
    fn next_event(&mut self) -> Option<KeyEvent>;
}

/// Dispatcher that replays a fixed sequence of events, for tests.
#[derive(Debug, Default)]
pub struct ScriptedDispatcher {
    events: VecDeque<KeyEvent>,
}

impl ScriptedDispatcher {
    /// Create a dispatcher that will deliver `events` in order.
    pub fn new(events: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl HotkeyDispatcher for ScriptedDispatcher {
    fn next_event(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }
}

/// Dispatcher backed by a global OS hotkey.
///
/// Registering the key suppresses its default action while held, which is
/// what makes press-and-hold dictation usable over a regular key.
#[cfg(feature = "hotkeys")]
pub struct GlobalHotkeyDispatcher {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

#[cfg(feature = "hotkeys")]
impl GlobalHotkeyDispatcher {
    /// Register `record_key` (e.g. "F9", "ctrl+space") as the global
    /// push-to-talk key.
    pub fn new(record_key: &str) -> Result<Self> {
        let hotkey = parse_hotkey(record_key)?;

        let manager =
            GlobalHotKeyManager::new().map_err(|e| HoldtypeError::HotkeyRegistration {
                key: record_key.to_string(),
                message: format!("Failed to create hotkey manager: {}", e),
            })?;

        manager
            .register(hotkey)
            .map_err(|e| HoldtypeError::HotkeyRegistration {
                key: record_key.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { manager, hotkey })
    }
}

#[cfg(feature = "hotkeys")]
impl HotkeyDispatcher for GlobalHotkeyDispatcher {
    fn next_event(&mut self) -> Option<KeyEvent> {
        loop {
            match GlobalHotKeyEvent::receiver().recv() {
                Ok(event) if event.id() == self.hotkey.id() => {
                    return Some(match event.state() {
                        HotKeyState::Pressed => KeyEvent::Pressed,
                        HotKeyState::Released => KeyEvent::Released,
                    });
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(feature = "hotkeys")]
impl Drop for GlobalHotkeyDispatcher {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.hotkey);
    }
}

/// Parse a hotkey string like "F9" or "ctrl+shift+space".
#[cfg(feature = "hotkeys")]
fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
    let parts: Vec<&str> = hotkey_str.split('+').map(|s| s.trim()).collect();

    if parts.is_empty() || parts.iter().all(|p| p.is_empty()) {
        return Err(HoldtypeError::HotkeyRegistration {
            key: hotkey_str.to_string(),
            message: "hotkey string is empty".to_string(),
        });
    }

    let mut modifiers = Modifiers::empty();
    let mut key_code = None;

    for part in parts {
        match part.to_lowercase().as_str() {
            "cmd" | "command" | "super" => modifiers |= Modifiers::SUPER,
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            key => {
                key_code = Some(parse_key_code(hotkey_str, key)?);
            }
        }
    }

    let code = key_code.ok_or_else(|| HoldtypeError::HotkeyRegistration {
        key: hotkey_str.to_string(),
        message: "no key code found in hotkey string".to_string(),
    })?;

    let mods = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };
    Ok(HotKey::new(mods, code))
}

#[cfg(feature = "hotkeys")]
fn parse_key_code(hotkey_str: &str, key: &str) -> Result<Code> {
    let code = match key.to_uppercase().as_str() {
        "A" => Code::KeyA,
        "B" => Code::KeyB,
        "C" => Code::KeyC,
        "D" => Code::KeyD,
        "E" => Code::KeyE,
        "F" => Code::KeyF,
        "G" => Code::KeyG,
        "H" => Code::KeyH,
        "I" => Code::KeyI,
        "J" => Code::KeyJ,
        "K" => Code::KeyK,
        "L" => Code::KeyL,
        "M" => Code::KeyM,
        "N" => Code::KeyN,
        "O" => Code::KeyO,
        "P" => Code::KeyP,
        "Q" => Code::KeyQ,
        "R" => Code::KeyR,
        "S" => Code::KeyS,
        "T" => Code::KeyT,
        "U" => Code::KeyU,
        "V" => Code::KeyV,
        "W" => Code::KeyW,
        "X" => Code::KeyX,
        "Y" => Code::KeyY,
        "Z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        "SPACE" => Code::Space,
        "ENTER" | "RETURN" => Code::Enter,
        "TAB" => Code::Tab,
        "BACKSPACE" => Code::Backspace,
        "ESCAPE" | "ESC" => Code::Escape,
        _ => {
            return Err(HoldtypeError::HotkeyRegistration {
                key: hotkey_str.to_string(),
                message: format!("unknown key code: {}", key),
            });
        }
    };
    Ok(code)
}
