use std::net::IpAddr;

use ipnetwork::IpNetwork;
use log::{debug, info};

use super::error::ResolveError;

/// Checks `address` against a CIDR allow-list.
///
/// An empty list means no restriction is configured and always passes.
/// Otherwise the address must fall inside at least one block.
pub fn check_allowed(address: &str, cidr_list: &[String]) -> Result<(), ResolveError> {
    if cidr_list.is_empty() {
        debug!("No IPv4 allow list is present, skipping check");
        return Ok(());
    }

    let mut networks = Vec::with_capacity(cidr_list.len());
    for cidr in cidr_list {
        let network: IpNetwork = cidr
            .trim()
            .parse()
            .map_err(|_| ResolveError::InvalidAllowList { cidr: cidr.clone() })?;
        // Host bits must be zero, `10.0.0.5/8` is rejected rather than widened.
        if network.ip() != network.network() {
            return Err(ResolveError::InvalidAllowList { cidr: cidr.clone() });
        }
        networks.push(network);
    }

    let ip: IpAddr = match address.trim().parse() {
        Ok(ip) => ip,
        Err(_) => {
            return Err(ResolveError::AddressNotAllowed {
                address: address.to_string(),
            })
        }
    };

    for network in networks.iter() {
        if network.contains(ip) {
            info!("Matched {ip} to IP CIDR {network}");
            return Ok(());
        }
        debug!("Source IP {ip} doesn't match IP CIDR {network}");
    }

    Err(ResolveError::AddressNotAllowed {
        address: address.to_string(),
    })
}
