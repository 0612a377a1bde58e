//! Recognition of Fire TV devices among the bonded set.

use crate::bluetooth::platform::DeviceRecord;

/// Name fragments used by the Fire TV family (case-sensitive).
pub const FIRE_TV_PATTERNS: &[&str] = &["Fire TV", "AFTM", "AFT"];

pub fn is_fire_tv_name(name: &str) -> bool {
   FIRE_TV_PATTERNS.iter().any(|pattern| name.contains(pattern))
}

/// Keeps the records whose name matches a Fire TV pattern, in input order.
pub fn filter_candidates<I>(devices: I) -> Vec<DeviceRecord>
where
   I: IntoIterator<Item = DeviceRecord>,
{
   devices
      .into_iter()
      .filter(|device| {
         let matched = is_fire_tv_name(&device.name);
         if matched {
            log::debug!("Fire TV candidate: {} ({})", device.name, device.address);
         }
         matched
      })
      .collect()
}

#[cfg(test)]
mod tests {
   use bluer::Address;

   use super::*;

   #[test]
   fn test_name_patterns() {
      assert!(is_fire_tv_name("Fire TV Stick 4K"));
      assert!(is_fire_tv_name("Living room Fire TV"));
      assert!(is_fire_tv_name("AFTMM"));
      assert!(is_fire_tv_name("AFTKA"));
      assert!(is_fire_tv_name("xAFTx"));

      assert!(!is_fire_tv_name("fire tv"));
      assert!(!is_fire_tv_name("FIRE TV"));
      assert!(!is_fire_tv_name("aft"));
      assert!(!is_fire_tv_name("Firetv"));
      assert!(!is_fire_tv_name("AirPods Pro"));
      assert!(!is_fire_tv_name(""));
   }

   #[test]
   fn test_filter_matches_substring_rule() {
      let names = [
         "Fire TV Cube",
         "Pixel Buds",
         "AFTMM",
         "Chromecast",
         "My AFT box",
         "fire tv",
         "",
      ];
      let records: Vec<DeviceRecord> = names
         .iter()
         .enumerate()
         .map(|(i, name)| DeviceRecord::new(*name, Address::new([0, 0, 0, 0, 0, i as u8])))
         .collect();

      let kept = filter_candidates(records.clone());
      for record in &records {
         let expected = FIRE_TV_PATTERNS.iter().any(|p| record.name.contains(p));
         assert_eq!(kept.contains(record), expected, "{}", record.name);
      }
      let kept_names: Vec<&str> = kept.iter().map(|d| d.name.as_str()).collect();
      assert_eq!(kept_names, ["Fire TV Cube", "AFTMM", "My AFT box"]);
   }

   #[test]
   fn test_filter_empty_input() {
      assert!(filter_candidates(Vec::new()).is_empty());
   }
}
