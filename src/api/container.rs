// ABOUTME: Maps canonical container output onto bollard's container creation body.
// ABOUTME: Fields with no slot in the request model are logged and left out.

use std::collections::HashMap;

use bollard::models::{
    ContainerCreateBody, DeviceMapping, HostConfig, HostConfigLogConfig, PortBinding,
    ResourcesBlkioWeightDevice, ResourcesUlimits, RestartPolicy, RestartPolicyNameEnum,
    ThrottleDevice,
};
use tracing::debug;

use super::{ApiError, Fields, hash_map, parse_bytes};
use crate::translate::{CanonicalOutput, CanonicalValue};
use crate::types::{self, DeviceRate, Rate, RestartPolicyName};

/// Fields consumed elsewhere: `name` is a query parameter, `mac_address` belongs to
/// a network endpoint, the rest have no API slot.
const UNMAPPED: &[&str] = &[
    "cpu_group",
    "detach",
    "isolation",
    "lxc_conf",
    "mac_address",
    "name",
];

/// Build the container creation body for canonical container output.
///
/// Byte sizes such as `mem_limit: 512m` are resolved here. A field that was
/// passed through untranslated cannot be mapped and fails the call.
pub fn container_config(output: &CanonicalOutput) -> Result<ContainerCreateBody, ApiError> {
    let fields = Fields(output);
    for name in UNMAPPED {
        if output.contains_key(name) {
            debug!(field = name, "field has no slot in the container body");
        }
    }

    let host_config = HostConfig {
        auto_remove: fields.bool("auto_remove")?,
        binds: binds(&fields)?,
        blkio_weight: fields.int("blkio_weight")?,
        blkio_weight_device: weight_devices(&fields)?,
        blkio_device_read_bps: throttle(&fields, "device_read_bps")?,
        blkio_device_read_iops: throttle(&fields, "device_read_iops")?,
        blkio_device_write_bps: throttle(&fields, "device_write_bps")?,
        blkio_device_write_iops: throttle(&fields, "device_write_iops")?,
        cap_add: fields.list("cap_add")?,
        cap_drop: fields.list("cap_drop")?,
        cpu_period: fields.int("cpu_period")?,
        cpu_shares: fields.int("cpu_shares")?,
        cpuset_cpus: fields.string("cpuset_cpus")?,
        cpuset_mems: fields.string("cpuset_mems")?,
        devices: devices(&fields)?,
        dns: fields.list("dns")?,
        dns_options: fields.list("dns_opt")?,
        dns_search: fields.list("dns_search")?,
        extra_hosts: joined(&fields, "extra_hosts", ':')?,
        group_add: fields.list("group_add")?,
        ipc_mode: fields.string("ipc_mode")?,
        links: joined(&fields, "links", ':')?,
        log_config: log_config(&fields)?,
        memory: fields.bytes("mem_limit")?,
        memory_swap: fields.bytes("memswap_limit")?,
        memory_swappiness: fields.int("mem_swappiness")?,
        network_mode: fields.string("network_mode")?,
        oom_kill_disable: fields.bool("oom_kill_disable")?,
        oom_score_adj: fields.int("oom_score_adj")?,
        pid_mode: fields.string("pid_mode")?,
        pids_limit: fields.int("pids_limit")?,
        port_bindings: port_bindings(&fields)?,
        privileged: fields.bool("privileged")?,
        publish_all_ports: fields.bool("publish_all_ports")?,
        readonly_rootfs: fields.bool("read_only")?,
        restart_policy: restart_policy(&fields)?,
        security_opt: fields.list("security_opt")?,
        shm_size: fields.bytes("shm_size")?,
        storage_opt: fields.map("storage_opt")?,
        sysctls: fields.map("sysctls")?,
        tmpfs: tmpfs(&fields)?,
        ulimits: ulimits(&fields)?,
        userns_mode: fields.string("userns_mode")?,
        volume_driver: fields.string("volume_driver")?,
        volumes_from: fields.list("volumes_from")?,
        ..Default::default()
    };

    Ok(ContainerCreateBody {
        cmd: command(&fields, "command")?,
        domainname: fields.string("domainname")?,
        entrypoint: command(&fields, "entrypoint")?,
        env: joined(&fields, "environment", '=')?,
        exposed_ports: exposed_ports(&fields)?,
        host_config: Some(host_config),
        hostname: fields.string("hostname")?,
        labels: fields.map("labels")?,
        network_disabled: fields.bool("network_disabled")?,
        open_stdin: fields.bool("stdin_open")?,
        stop_signal: fields.string("stop_signal")?,
        stop_timeout: fields.int("stop_timeout")?,
        tty: fields.bool("tty")?,
        user: fields.string("user")?,
        volumes: fields.list("volumes")?,
        working_dir: fields.string("working_dir")?,
        ..Default::default()
    })
}

fn unexpected(field: &str) -> ApiError {
    ApiError::UnexpectedValue {
        field: field.to_string(),
    }
}

/// A command given as a single string is split on whitespace.
fn command(fields: &Fields<'_>, field: &str) -> Result<Option<Vec<String>>, ApiError> {
    match fields.value(field)? {
        None => Ok(None),
        Some(CanonicalValue::Str(line)) => {
            Ok(Some(line.split_whitespace().map(str::to_string).collect()))
        }
        Some(CanonicalValue::List(args)) => Ok(Some(args.clone())),
        Some(_) => Err(unexpected(field)),
    }
}

/// A key/value field rendered as `key<delim>value` strings.
fn joined(fields: &Fields<'_>, field: &str, delim: char) -> Result<Option<Vec<String>>, ApiError> {
    Ok(fields.map(field)?.map(|map| {
        let mut pairs: Vec<String> = map
            .into_iter()
            .map(|(key, value)| format!("{key}{delim}{value}"))
            .collect();
        pairs.sort();
        pairs
    }))
}

fn binds(fields: &Fields<'_>) -> Result<Option<Vec<String>>, ApiError> {
    match fields.value("binds")? {
        None => Ok(None),
        Some(CanonicalValue::Binds(binds)) => {
            Ok(Some(binds.iter().map(ToString::to_string).collect()))
        }
        Some(_) => Err(unexpected("binds")),
    }
}

fn exposed_ports(fields: &Fields<'_>) -> Result<Option<Vec<String>>, ApiError> {
    match fields.value("ports")? {
        None => Ok(None),
        Some(CanonicalValue::Ports(ports)) => {
            Ok(Some(ports.iter().map(types::PortDef::api_key).collect()))
        }
        Some(_) => Err(unexpected("ports")),
    }
}

fn port_bindings(
    fields: &Fields<'_>,
) -> Result<Option<HashMap<String, Option<Vec<PortBinding>>>>, ApiError> {
    let table = match fields.value("port_bindings")? {
        None => return Ok(None),
        Some(CanonicalValue::PortBindings(table)) => table,
        Some(_) => return Err(unexpected("port_bindings")),
    };

    let bindings = table
        .iter()
        .map(|(port, endpoints)| {
            let endpoints = endpoints
                .iter()
                .map(|endpoint| PortBinding {
                    host_ip: endpoint.host_ip().map(str::to_string),
                    host_port: endpoint.host_port().map(|p| p.to_string()),
                })
                .collect();
            (port.api_key(), Some(endpoints))
        })
        .collect();
    Ok(Some(bindings))
}

fn restart_policy(fields: &Fields<'_>) -> Result<Option<RestartPolicy>, ApiError> {
    let policy = match fields.value("restart_policy")? {
        None => return Ok(None),
        Some(CanonicalValue::RestartPolicy(policy)) => policy,
        Some(_) => return Err(unexpected("restart_policy")),
    };

    let name = match policy.name {
        RestartPolicyName::No => RestartPolicyNameEnum::NO,
        RestartPolicyName::Always => RestartPolicyNameEnum::ALWAYS,
        RestartPolicyName::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
        RestartPolicyName::OnFailure => RestartPolicyNameEnum::ON_FAILURE,
    };
    Ok(Some(RestartPolicy {
        name: Some(name),
        maximum_retry_count: Some(i64::from(policy.maximum_retry_count)),
    }))
}

fn log_config(fields: &Fields<'_>) -> Result<Option<HostConfigLogConfig>, ApiError> {
    match fields.value("log_config")? {
        None => Ok(None),
        Some(CanonicalValue::LogConfig(config)) => Ok(Some(HostConfigLogConfig {
            typ: Some(config.driver.clone()),
            config: Some(hash_map(&config.options)),
        })),
        Some(_) => Err(unexpected("log_config")),
    }
}

fn ulimits(fields: &Fields<'_>) -> Result<Option<Vec<ResourcesUlimits>>, ApiError> {
    match fields.value("ulimits")? {
        None => Ok(None),
        Some(CanonicalValue::Ulimits(limits)) => Ok(Some(
            limits
                .iter()
                .map(|limit| ResourcesUlimits {
                    name: Some(limit.name.clone()),
                    soft: Some(limit.soft),
                    hard: Some(limit.hard),
                })
                .collect(),
        )),
        Some(_) => Err(unexpected("ulimits")),
    }
}

fn weight_devices(fields: &Fields<'_>) -> Result<Option<Vec<ResourcesBlkioWeightDevice>>, ApiError> {
    match fields.value("blkio_weight_device")? {
        None => Ok(None),
        Some(CanonicalValue::WeightDevices(devices)) => Ok(Some(
            devices
                .iter()
                .map(|device| ResourcesBlkioWeightDevice {
                    path: Some(device.path.clone()),
                    weight: Some(device.weight.into()),
                })
                .collect(),
        )),
        Some(_) => Err(unexpected("blkio_weight_device")),
    }
}

fn throttle(fields: &Fields<'_>, field: &str) -> Result<Option<Vec<ThrottleDevice>>, ApiError> {
    let rates = match fields.value(field)? {
        None => return Ok(None),
        Some(CanonicalValue::DeviceRates(rates)) => rates,
        Some(_) => return Err(unexpected(field)),
    };
    rates
        .iter()
        .map(|rate| throttle_device(field, rate))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn throttle_device(field: &str, device: &DeviceRate) -> Result<ThrottleDevice, ApiError> {
    let (rate, text) = match &device.rate {
        Rate::Count(count) => (i64::try_from(*count).ok(), count.to_string()),
        Rate::WithUnit(size) => (parse_bytes(size), size.clone()),
    };
    let rate = rate.ok_or_else(|| ApiError::InvalidSize {
        field: field.to_string(),
        value: text,
    })?;
    Ok(ThrottleDevice {
        path: Some(device.path.clone()),
        rate: Some(rate),
    })
}

/// `host[:container[:permissions]]` device strings.
fn devices(fields: &Fields<'_>) -> Result<Option<Vec<DeviceMapping>>, ApiError> {
    Ok(fields.list("devices")?.map(|devices| {
        devices
            .iter()
            .map(|device| {
                let mut parts = device.splitn(3, ':');
                let host = parts.next().unwrap_or_default().to_string();
                let container = parts.next().map_or_else(|| host.clone(), str::to_string);
                let permissions = parts.next().unwrap_or("rwm").to_string();
                DeviceMapping {
                    path_on_host: Some(host),
                    path_in_container: Some(container),
                    cgroup_permissions: Some(permissions),
                }
            })
            .collect()
    }))
}

fn tmpfs(fields: &Fields<'_>) -> Result<Option<HashMap<String, String>>, ApiError> {
    match fields.value("tmpfs")? {
        None => Ok(None),
        Some(CanonicalValue::Dict(mounts)) => Ok(Some(
            mounts
                .iter()
                .map(|(path, options)| {
                    let options = match options {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (path.clone(), options)
                })
                .collect(),
        )),
        Some(_) => Err(unexpected("tmpfs")),
    }
}
