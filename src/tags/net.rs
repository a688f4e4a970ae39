//! IPv4 address arithmetic tags.
//!
//! These tags are not part of the core tag set; they are written against the
//! public [`Tag`] contract only and show how a third party extends the engine.
//! [`register`] adds all of them to a registry.
//!
//! | Tag | Arguments | Result |
//! |-----|-----------|--------|
//! | `ipv4-host-ip` | `"a.b.c.d/n"`, host index | `"a.b.c.d"` of the indexed host |
//! | `ipv4-host-gateway` | `"a.b.c.d/n"` | first host address |
//! | `ipv4-host-netmask` | `"a.b.c.d/n"` | dotted-quad netmask |
//! | `ipv4-subnet` | `"a.b.c.d/n"`, subnet count, subnet index | `"a.b.c.d/m"` |

use super::{Tag, TagRegistry, check_arity, resolve_required, resolve_string_arg};
use crate::core::{Result, TemplateError};
use crate::templating::Resolver;
use serde_json::Value;
use std::net::Ipv4Addr;

/// Register every IPv4 tag.
pub fn register(registry: &mut TagRegistry) {
    registry.register(Box::new(Ipv4HostIpTag));
    registry.register(Box::new(Ipv4HostGatewayTag));
    registry.register(Box::new(Ipv4HostNetmaskTag));
    registry.register(Box::new(Ipv4SubnetTag));
}

/// Parse `a.b.c.d/n` into the network address as an integer and the prefix
/// length. Host bits below the prefix are cleared, so `10.0.1.7/16` is the
/// network `10.0.0.0/16`.
///
/// The prefix is optional only when `require_prefix` is false.
fn parse_network(tag: &str, text: &str, require_prefix: bool) -> Result<(u32, Option<u32>)> {
    let invalid = || TemplateError::malformed(format!("Tag \"{tag}\" invalid IPv4 network \"{text}\""));

    let (address, prefix) = match text.split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None if require_prefix => return Err(invalid()),
        None => (text, None),
    };
    let address: Ipv4Addr = address.trim().parse().map_err(|_| invalid())?;
    let prefix = match prefix {
        Some(prefix) => {
            let prefix: u32 = prefix.trim().parse().map_err(|_| invalid())?;
            if prefix > 32 {
                return Err(invalid());
            }
            Some(prefix)
        }
        None => None,
    };
    let address = u32::from(address);
    Ok(match prefix {
        Some(prefix) => (address & netmask(prefix), Some(prefix)),
        None => (address, None),
    })
}

/// Resolve an integer argument given either as a JSON integer or a numeric string.
fn resolve_integer(
    tag: &str,
    token: &Value,
    bindings: &[&Value],
    resolver: &mut Resolver<'_>,
) -> Result<i64> {
    let value = resolve_required(tag, token, bindings, resolver)?;
    let parsed = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        TemplateError::malformed(format!("Tag \"{tag}\" expects an integer, found {value}"))
    })
}

/// Number of addresses in a network with the given prefix.
fn host_count(prefix: u32) -> u64 {
    1u64 << (32 - prefix)
}

fn netmask(prefix: u32) -> u32 {
    u32::MAX.checked_shl(32 - prefix).unwrap_or(0)
}

/// Address of the `index`th host of a network.
pub struct Ipv4HostIpTag;

impl Tag for Ipv4HostIpTag {
    fn name(&self) -> &'static str {
        "ipv4-host-ip"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 2)?;
        let network = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        let index = resolve_integer(self.name(), &tokens[1], bindings, resolver)?;

        let (address, prefix) = parse_network(self.name(), &network, true)?;
        let prefix = prefix.unwrap_or(32);
        let in_range = u64::try_from(index).is_ok_and(|i| i > 0 && i < host_count(prefix));
        if !in_range {
            return Err(TemplateError::malformed(format!(
                "Tag \"{}\" host index {index} is out of range for {network}",
                self.name()
            )));
        }

        let host = Ipv4Addr::from(address.wrapping_add(index as u32));
        Ok(Some(Value::String(host.to_string())))
    }
}

/// First host address of a network, conventionally its gateway.
pub struct Ipv4HostGatewayTag;

impl Tag for Ipv4HostGatewayTag {
    fn name(&self) -> &'static str {
        "ipv4-host-gateway"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let network = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        let (address, _) = parse_network(self.name(), &network, false)?;
        Ok(Some(Value::String(Ipv4Addr::from(address.wrapping_add(1)).to_string())))
    }
}

/// Netmask of a network in dotted-quad form.
pub struct Ipv4HostNetmaskTag;

impl Tag for Ipv4HostNetmaskTag {
    fn name(&self) -> &'static str {
        "ipv4-host-netmask"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let network = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        let (_, prefix) = parse_network(self.name(), &network, true)?;
        let mask = Ipv4Addr::from(netmask(prefix.unwrap_or(32)));
        Ok(Some(Value::String(mask.to_string())))
    }
}

/// One of `count` equally sized subnets of a network.
pub struct Ipv4SubnetTag;

impl Tag for Ipv4SubnetTag {
    fn name(&self) -> &'static str {
        "ipv4-subnet"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 3)?;
        let network = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        let count = resolve_integer(self.name(), &tokens[1], bindings, resolver)?;
        let index = resolve_integer(self.name(), &tokens[2], bindings, resolver)?;

        let count = u64::try_from(count).ok().filter(|c| c.is_power_of_two()).ok_or_else(|| {
            TemplateError::malformed(format!(
                "Tag \"{}\" subnet count must be a power of two, {count} given",
                self.name()
            ))
        })?;
        if count == 1 {
            return Ok(Some(Value::String(network)));
        }

        let (address, prefix) = parse_network(self.name(), &network, true)?;
        let subnet_prefix = prefix.unwrap_or(32) + count.trailing_zeros();
        if subnet_prefix > 32 {
            return Err(TemplateError::malformed(format!(
                "Tag \"{}\" cannot split {network} into {count} subnets",
                self.name()
            )));
        }
        let index = u64::try_from(index).ok().filter(|i| *i < count).ok_or_else(|| {
            TemplateError::malformed(format!(
                "Tag \"{}\" subnet index {index} is out of range for {count} subnets",
                self.name()
            ))
        })?;

        let offset = index << (32 - subnet_prefix);
        let subnet = Ipv4Addr::from(address.wrapping_add(offset as u32));
        Ok(Some(Value::String(format!("{subnet}/{subnet_prefix}"))))
    }
}
