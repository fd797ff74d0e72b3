//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `config_file`  | ConfigPort         | TOML session file           |
//! | `log_sink`     | EventSink          | `log` facade                |
//! | `recorder`     | TickLog            | JSON-lines file / memory    |
//! |                | ReplaySource       | JSON-lines recording        |
//! | `sim`          | PositionSource     | constant-velocity walker    |
//! | `time`         | Clock, Waiter      | `std::time` / thread sleep  |

pub mod config_file;
pub mod log_sink;
pub mod recorder;
pub mod sim;
pub mod time;
