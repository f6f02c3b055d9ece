//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements                      | Connects to                |
//! |--------------|---------------------------------|----------------------------|
//! | `board`      | Board (all board ports)         | the parts below            |
//! | `hardware`   | RailSensors, IndicatorPort      | embedded-hal GPIO          |
//! | `subsystems` | Moisture/Irrigation/Radio/Config| nothing (bring-up stubs)   |
//! | `time`       | TickSource                      | ESP32 system timer         |

pub mod board;
pub mod hardware;
pub mod subsystems;
pub mod time;
