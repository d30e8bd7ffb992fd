pub mod ports;
pub mod resolve_use_case;
