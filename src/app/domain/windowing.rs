use serde_json::{json, Value};

/// Reserved settings key holding the persisted window state.
pub const WINDOWING_KEY: &str = "Windowing";

/// Window geometry and display mode as persisted in settings.
///
/// The three flags mirror whatever the window system last reported; they
/// are not forced to be mutually exclusive here. `width`/`height` hold the
/// last known normal-windowed geometry, see
/// [`apply_live_geometry`](Windowing::apply_live_geometry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windowing {
    pub width: i32,
    pub height: i32,
    pub fullscreen: bool,
    pub maximized: bool,
    pub minimized: bool,
}

impl Default for Windowing {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            maximized: false,
            minimized: false,
        }
    }
}

/// How the shell should bring up the main window. Exactly one mode
/// applies per startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    Fullscreen,
    Maximized,
    Minimized,
    Windowed { width: i32, height: i32 },
}

impl Windowing {
    /// Decode whatever `get("Windowing")` returned. Runs on every startup
    /// path, so it never fails: anything that is not an object yields the
    /// hard-coded default, and within an object each field degrades to
    /// its zero value on absence or shape mismatch. Numbers are read as
    /// f64 and truncated, since serialization widens integers.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let int = |key: &str| {
            map.get(key)
                .and_then(Value::as_f64)
                .map(|f| f as i32)
                .unwrap_or(0)
        };
        let flag = |key: &str| map.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            width: int("Width"),
            height: int("Height"),
            fullscreen: flag("Fullscreen"),
            maximized: flag("Maximized"),
            minimized: flag("Minimized"),
        }
    }

    /// The value stored back under [`WINDOWING_KEY`].
    pub fn to_value(&self) -> Value {
        json!({
            "Width": self.width,
            "Height": self.height,
            "Fullscreen": self.fullscreen,
            "Maximized": self.maximized,
            "Minimized": self.minimized,
        })
    }

    /// Reconcile with live window state. The flags always track the
    /// window system; geometry is only captured in normal windowed mode,
    /// so un-maximizing restores the last sane size instead of whatever
    /// transient size the OS reported mid-transition.
    pub fn apply_live_geometry(
        &mut self,
        width: i32,
        height: i32,
        fullscreen: bool,
        maximized: bool,
        minimized: bool,
    ) {
        self.fullscreen = fullscreen;
        self.maximized = maximized;
        self.minimized = minimized;
        if !fullscreen && !maximized && !minimized {
            self.width = width;
            self.height = height;
        }
    }

    /// Startup display mode. Policy ordering: fullscreen beats maximized
    /// beats minimized beats an explicit windowed size.
    pub fn start_mode(&self) -> StartMode {
        if self.fullscreen {
            StartMode::Fullscreen
        } else if self.maximized {
            StartMode::Maximized
        } else if self.minimized {
            StartMode::Minimized
        } else {
            StartMode::Windowed {
                width: self.width,
                height: self.height,
            }
        }
    }
}
