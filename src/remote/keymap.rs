//! Remote control keys and the panel they are laid out on.

use serde_json::json;

/// Keys exposed by the control panel, valued by their Android keycode.
#[repr(u8)]
#[derive(
   Debug,
   Clone,
   Copy,
   PartialEq,
   Eq,
   Hash,
   strum::FromRepr,
   strum::Display,
   strum::EnumString,
   strum::EnumIter,
   strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RemoteKey {
   Home = 3,
   Back = 4,
   #[strum(to_string = "up")]
   DpadUp = 19,
   #[strum(to_string = "down")]
   DpadDown = 20,
   #[strum(to_string = "left")]
   DpadLeft = 21,
   #[strum(to_string = "right")]
   DpadRight = 22,
   #[strum(to_string = "ok", serialize = "select", serialize = "center")]
   DpadCenter = 23,
   Menu = 82,
   #[strum(to_string = "play_pause", serialize = "play")]
   PlayPause = 85,
   Rewind = 89,
   FastForward = 90,
}

impl RemoteKey {
   pub const fn keycode(self) -> u8 {
      self as u8
   }

   pub fn name(self) -> &'static str {
      self.into()
   }

   /// Text printed on the panel button.
   pub const fn label(self) -> &'static str {
      match self {
         Self::Home => "HOME",
         Self::Back => "BACK",
         Self::DpadUp => "UP",
         Self::DpadDown => "DOWN",
         Self::DpadLeft => "LEFT",
         Self::DpadRight => "RIGHT",
         Self::DpadCenter => "OK",
         Self::Menu => "MENU",
         Self::PlayPause => "PLAY",
         Self::Rewind => "<<",
         Self::FastForward => ">>",
      }
   }

   pub fn to_json(self) -> serde_json::Value {
      json!({
         "name": self.name(),
         "label": self.label(),
         "keycode": self.keycode(),
      })
   }
}

type Row = &'static [Option<RemoteKey>];

/// Panel rows, top to bottom. `None` is an empty cell.
pub const PANEL_LAYOUT: &[Row] = &[
   &[Some(RemoteKey::Home), Some(RemoteKey::Back), Some(RemoteKey::Menu)],
   &[None, Some(RemoteKey::DpadUp), None],
   &[
      Some(RemoteKey::DpadLeft),
      Some(RemoteKey::DpadCenter),
      Some(RemoteKey::DpadRight),
   ],
   &[None, Some(RemoteKey::DpadDown), None],
   &[
      Some(RemoteKey::Rewind),
      Some(RemoteKey::PlayPause),
      Some(RemoteKey::FastForward),
   ],
];

pub fn panel_json() -> serde_json::Value {
   PANEL_LAYOUT
      .iter()
      .map(|row| {
         row.iter()
            .map(|cell| cell.map_or(serde_json::Value::Null, RemoteKey::to_json))
            .collect::<serde_json::Value>()
      })
      .collect()
}
