// ABOUTME: Field registry and cross-field rules for container creation.
// ABOUTME: Merges binds into volumes, bound ports into ports and log options into log_config.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use super::error::{ConflictSnafu, TranslateError};
use super::schema::{FieldKind as K, FieldSpec as F, Schema, build_revmap};
use super::sealed::Sealed;
use super::value::{CanonicalOutput, CanonicalValue};
use crate::types::{LogConfig, RateUnit};

/// Container creation parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Container;

static FIELDS: &[F] = &[
    F::new("auto_remove", K::Bool).with_aliases(&["rm"]).since(1, 25),
    F::new("binds", K::Binds),
    F::new("blkio_weight", K::Int).since(1, 22),
    F::new("blkio_weight_device", K::WeightDevice).since(1, 22),
    F::new("cap_add", K::StringList),
    F::new("cap_drop", K::StringList),
    F::new("command", K::Command).with_aliases(&["cmd"]),
    F::new("cpu_group", K::Int),
    F::new("cpu_period", K::Int),
    F::new("cpu_shares", K::Int),
    F::new("cpuset_cpus", K::Str).with_aliases(&["cpuset"]),
    F::new("cpuset_mems", K::Str),
    F::new("detach", K::Bool),
    F::new("device_read_bps", K::DeviceRate(RateUnit::Bytes)).since(1, 22),
    F::new("device_read_iops", K::DeviceRate(RateUnit::Ops)).since(1, 22),
    F::new("device_write_bps", K::DeviceRate(RateUnit::Bytes)).since(1, 22),
    F::new("device_write_iops", K::DeviceRate(RateUnit::Ops)).since(1, 22),
    F::new("devices", K::StringList),
    F::new("dns", K::IpList),
    F::new("dns_opt", K::StringList).since(1, 21),
    F::new("dns_search", K::StringList),
    F::new("domainname", K::Str),
    F::new("entrypoint", K::Command),
    F::new("environment", K::key_value('=')).with_aliases(&["env"]),
    F::new("extra_hosts", K::ip_key_value(':')),
    F::new("group_add", K::StringList).since(1, 20),
    F::new("hostname", K::Str),
    F::new("ipc_mode", K::Str).with_aliases(&["ipc"]),
    F::new("isolation", K::Str).since(1, 24),
    F::new("labels", K::Labels).with_aliases(&["label"]),
    F::new("links", K::key_value(':')),
    F::new("log_config", K::LogConfig),
    F::new("log_driver", K::Str),
    F::new("log_opt", K::key_value('=')),
    F::new("lxc_conf", K::key_value('=')),
    F::new("mac_address", K::Str),
    F::new("mem_limit", K::IntOrString).with_aliases(&["memory"]),
    F::new("mem_swappiness", K::Int).since(1, 20),
    F::new("memswap_limit", K::IntOrString).with_aliases(&["memory_swap"]),
    F::new("name", K::Str),
    F::new("network_disabled", K::Bool),
    F::new("network_mode", K::Str),
    F::new("oom_kill_disable", K::Bool).since(1, 20),
    F::new("oom_score_adj", K::Int).since(1, 22),
    F::new("pid_mode", K::Str),
    F::new("pids_limit", K::Int).since(1, 23),
    F::new("port_bindings", K::PortBindings).with_aliases(&["publish"]),
    F::new("ports", K::Ports).with_aliases(&["expose"]),
    F::new("privileged", K::Bool),
    F::new("publish_all_ports", K::Bool).with_aliases(&["publish_all"]),
    F::new("read_only", K::Bool),
    F::new("restart_policy", K::RestartPolicy).with_aliases(&["restart"]),
    F::new("security_opt", K::StringList),
    F::new("shm_size", K::IntOrString).since(1, 22),
    F::new("stdin_open", K::Bool).with_aliases(&["interactive"]),
    F::new("stop_signal", K::Str),
    F::new("stop_timeout", K::Int).since(1, 25),
    F::new("storage_opt", K::key_value('=')).since(1, 24),
    F::new("sysctls", K::key_value('=')).with_aliases(&["sysctl"]).since(1, 24),
    F::new("tmpfs", K::Dict).since(1, 22),
    F::new("tty", K::Bool),
    F::new("ulimits", K::Ulimits).with_aliases(&["ulimit"]),
    F::new("user", K::User),
    F::new("userns_mode", K::Str)
        .with_aliases(&["user_ns_mode"])
        .since(1, 23),
    F::new("volume_driver", K::Str).since(1, 21),
    F::new("volumes", K::PathList).with_aliases(&["volume"]),
    F::new("volumes_from", K::StringList),
    F::new("working_dir", K::AbsolutePath).with_aliases(&["workdir"]),
];

static ALIASES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_revmap(FIELDS));

impl Sealed for Container {}

impl Schema for Container {
    fn name(&self) -> &'static str {
        "container"
    }

    fn fields(&self) -> &'static [F] {
        FIELDS
    }

    fn aliases_revmap(&self) -> &'static BTreeMap<&'static str, &'static str> {
        &ALIASES
    }

    fn post_process(&self, output: &mut CanonicalOutput) -> Result<(), TranslateError> {
        check_conflicts(output)?;
        merge_bound_ports(output);
        merge_bind_volumes(output);
        merge_log_config(output)
    }
}

fn check_conflicts(output: &CanonicalOutput) -> Result<(), TranslateError> {
    let publish_all = output
        .get("publish_all_ports")
        .and_then(CanonicalValue::as_bool)
        .unwrap_or(false);
    if publish_all && output.contains_key("port_bindings") {
        return ConflictSnafu {
            field: "port_bindings",
            reason: "Cannot be used when publish_all_ports=True",
        }
        .fail();
    }

    let host_network = output
        .get("network_mode")
        .and_then(CanonicalValue::as_str)
        .is_some_and(|mode| mode == "host");
    if host_network && output.contains_key("hostname") {
        return ConflictSnafu {
            field: "hostname",
            reason: "Cannot be used when network_mode=host",
        }
        .fail();
    }
    Ok(())
}

/// Every bound container port is also exposed.
fn merge_bound_ports(output: &mut CanonicalOutput) {
    let bound: Vec<_> = match output.get("port_bindings") {
        Some(CanonicalValue::PortBindings(table)) => table.container_ports().collect(),
        _ => return,
    };
    if bound.is_empty() {
        return;
    }

    match output.get_mut("ports") {
        Some(CanonicalValue::Ports(ports)) => ports.extend(bound),
        None => output.insert("ports", CanonicalValue::Ports(bound.into_iter().collect())),
        Some(_) => {}
    }
}

/// Every bind's container path is also a volume; the result is sorted.
fn merge_bind_volumes(output: &mut CanonicalOutput) {
    let targets: Vec<String> = match output.get("binds") {
        Some(CanonicalValue::Binds(binds)) => binds.iter().map(|b| b.container.clone()).collect(),
        _ => return,
    };
    if targets.is_empty() {
        return;
    }

    let existing = match output.get("volumes") {
        Some(CanonicalValue::List(volumes)) => volumes.clone(),
        None => Vec::new(),
        Some(_) => return,
    };
    let volumes: BTreeSet<String> = existing.into_iter().chain(targets).collect();
    output.insert("volumes", CanonicalValue::List(volumes.into_iter().collect()));
}

/// Fold `log_driver` and `log_opt` into a single `log_config`.
fn merge_log_config(output: &mut CanonicalOutput) -> Result<(), TranslateError> {
    let driver = output.get("log_driver");
    let options = output.get("log_opt");
    if driver.is_none() && options.is_none() {
        return Ok(());
    }
    if output.contains_key("log_config") {
        return ConflictSnafu {
            field: "log_config",
            reason: "Cannot be used together with log_driver or log_opt",
        }
        .fail();
    }
    if driver.is_some_and(CanonicalValue::is_raw) || options.is_some_and(CanonicalValue::is_raw) {
        return Ok(());
    }

    let driver = match output.remove("log_driver") {
        Some(CanonicalValue::Str(driver)) => Some(driver),
        _ => None,
    };
    let options = match output.remove("log_opt") {
        Some(CanonicalValue::Map(options)) => Some(options),
        _ => None,
    };
    output.insert(
        "log_config",
        CanonicalValue::LogConfig(LogConfig::new(driver, options)),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_and_aliases_are_unique() {
        let mut seen = HashSet::new();
        for spec in FIELDS {
            assert!(seen.insert(spec.name), "duplicate field {}", spec.name);
            for alias in spec.aliases {
                assert!(seen.insert(*alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn revmap_points_at_canonical_names() {
        let schema = Container;
        assert_eq!(schema.canonical_name("rm"), "auto_remove");
        assert_eq!(schema.canonical_name("publish"), "port_bindings");
        assert_eq!(schema.canonical_name("tty"), "tty");
        for canonical in schema.aliases_revmap().values() {
            assert!(schema.field(canonical).is_some());
        }
    }
}
