pub mod bus;
pub mod inherit;

pub use bus::{
    is_valid_net_name, match_pin_to_bus, parse_bus_notation, resolve_bus_notation, BusName,
    BusRange,
};
pub use inherit::inherit;
