// Copyright (c) 2022-2023 The Skycoin Project

//! UDP transport for the Skywallet emulator

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use log::debug;
use tokio::net::UdpSocket;

use skywallet_proto::{Frame, FRAME_SIZE};

use super::Channel;
use crate::Error;

/// Emulator channel, one datagram per frame
pub struct EmulatorChannel {
    socket: Option<UdpSocket>,
}

impl EmulatorChannel {
    /// Connect to the emulator at the provided address
    pub async fn connect(addr: SocketAddr) -> Result<Self, Error> {
        debug!("Connecting to emulator at {}", addr);

        let socket = UdpSocket::bind(local_addr(&addr)).await?;
        socket.connect(addr).await?;

        Ok(Self {
            socket: Some(socket),
        })
    }

    fn socket(&self) -> Result<&UdpSocket, Error> {
        self.socket.as_ref().ok_or(Error::Disconnected)
    }
}

/// Unspecified local address in the family of `remote`
fn local_addr(remote: &SocketAddr) -> SocketAddr {
    match remote {
        SocketAddr::V4(_) => SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0),
        SocketAddr::V6(_) => SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0),
    }
}

#[async_trait]
impl Channel for EmulatorChannel {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        self.socket()?.send(frame).await?;
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
        let mut buff = [0u8; FRAME_SIZE];
        let n = self.socket()?.recv(&mut buff).await?;

        Ok(buff[..n].to_vec())
    }

    async fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Closed emulator channel");
        }
    }

    fn is_emulator(&self) -> bool {
        true
    }
}
