//! Desktop notifications through `org.freedesktop.Notifications`.

use std::collections::HashMap;

use log::{debug, warn};
use zbus::{Connection, proxy, zvariant::Value};

const APP_NAME: &str = "Fire TV Remote";
const EXPIRE_DEFAULT: i32 = -1;

#[proxy(
   interface = "org.freedesktop.Notifications",
   default_service = "org.freedesktop.Notifications",
   default_path = "/org/freedesktop/Notifications",
   gen_blocking = false
)]
trait Notifications {
   fn notify(
      &self,
      app_name: &str,
      replaces_id: u32,
      app_icon: &str,
      summary: &str,
      body: &str,
      actions: &[&str],
      hints: HashMap<&str, Value<'_>>,
      expire_timeout: i32,
   ) -> zbus::Result<u32>;
}

/// Best-effort notifier; a missing notification daemon only costs a log line.
pub struct Notifier {
   proxy: Option<NotificationsProxy<'static>>,
}

impl Notifier {
   pub async fn new(connection: &Connection, enabled: bool) -> Self {
      if !enabled {
         return Self::disabled();
      }
      match NotificationsProxy::new(connection).await {
         Ok(proxy) => Self { proxy: Some(proxy) },
         Err(e) => {
            warn!("Desktop notifications unavailable: {e}");
            Self::disabled()
         },
      }
   }

   pub const fn disabled() -> Self {
      Self { proxy: None }
   }

   pub async fn device_connected(&self, name: &str) {
      self.send(APP_NAME, &format!("Connected to {name}")).await;
   }

   async fn send(&self, summary: &str, body: &str) {
      let Some(proxy) = &self.proxy else {
         return;
      };
      match proxy
         .notify(APP_NAME, 0, "", summary, body, &[], HashMap::new(), EXPIRE_DEFAULT)
         .await
      {
         Ok(id) => debug!("Notification {id} shown: {body}"),
         Err(e) => warn!("Failed to show notification: {e}"),
      }
   }
}
