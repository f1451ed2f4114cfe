use std::net::IpAddr;

/// An address the server can be reached at from the local network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanAddress {
    pub interface: String,
    pub ip: IpAddr,
}

/// Keeps external IPv4 addresses only
pub fn external_ipv4<I>(interfaces: I) -> Vec<LanAddress>
where
    I: IntoIterator<Item = (String, IpAddr)>,
{
    interfaces
        .into_iter()
        .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
        .map(|(interface, ip)| LanAddress { interface, ip })
        .collect()
}

pub fn lan_addresses() -> std::io::Result<Vec<LanAddress>> {
    let interfaces = if_addrs::get_if_addrs()?;
    Ok(external_ipv4(
        interfaces.into_iter().map(|iface| {
            let ip = iface.ip();
            (iface.name, ip)
        }),
    ))
}

pub fn log_lan_addresses(port: u16) {
    match lan_addresses() {
        Ok(addresses) => {
            for addr in addresses {
                log::info!("   -> http://{}:{} ({})", addr.ip, port, addr.interface);
            }
        }
        Err(e) => log::warn!("⚠️  Could not enumerate network interfaces: {}", e),
    }
}
