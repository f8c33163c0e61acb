// ABOUTME: Validated domain types produced by the translation engine.
// ABOUTME: Each compound mini-grammar lives in its own module with its own error type.

mod api_version;
mod bind;
mod device_rate;
mod ipam;
mod log_config;
mod port;
mod port_binding;
mod restart_policy;
mod ulimit;

pub use api_version::{ApiVersion, ParseApiVersionError};
pub use bind::{Bind, BindError};
pub use device_rate::{DeviceRate, DeviceRateError, Rate, RateUnit, WeightDevice};
pub use ipam::{IpamError, IpamPool, pool_key};
pub use log_config::{DEFAULT_LOG_DRIVER, LogConfig};
pub use port::{
    PortDef, PortError, PortRange, Protocol, expand_port_spec, get_port_def, get_port_range,
    parse_ranged_port,
};
pub use port_binding::{BindingSpec, HostEndpoint, PortBindings, endpoints_from_value};
pub use restart_policy::{RestartPolicy, RestartPolicyError, RestartPolicyName};
pub use ulimit::{Ulimit, UlimitError};
