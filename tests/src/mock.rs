// Copyright (c) 2022-2023 The Skycoin Project

//! Scripted mock device
//!
//! A [MockDevice] holds a script of responses shared by every connection,
//! each message written by the host consumes one [Step].
//! `SimulateButtonPress` messages are recorded but never consume a step.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use log::debug;

use skywallet::{transport::Channel, Connect, DeviceType, Error};
use skywallet_proto::{Decoder, Frame, Message, MessageKind};

/// Scripted device response to a single host message
#[derive(Clone, PartialEq, Debug)]
pub enum Step {
    /// Respond with a message
    Reply(Message),
    /// Consume the message without responding
    Silent,
    /// Never respond, reads block until the channel is closed
    Stall,
}

impl From<Message> for Step {
    fn from(m: Message) -> Self {
        Step::Reply(m)
    }
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Step>,
    written: Vec<Message>,
    connects: usize,
    closes: usize,
    /// Connections currently open
    open: usize,
    /// Largest number of connections open at once
    max_open: usize,
}

/// Mock device, clones share state
#[derive(Clone, Debug)]
pub struct MockDevice {
    device_type: DeviceType,
    available: bool,
    state: Arc<Mutex<State>>,
}

impl MockDevice {
    /// Create a mock emulator device with the provided script
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self::with_type(DeviceType::Emulator, script)
    }

    /// Create a mock device of the provided type
    pub fn with_type(device_type: DeviceType, script: impl IntoIterator<Item = Step>) -> Self {
        let state = State {
            script: script.into_iter().collect(),
            ..Default::default()
        };

        Self {
            device_type,
            available: true,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Create a mock device reporting no device present
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::<Step>::new())
        }
    }

    /// Append steps to the script
    pub fn push(&self, steps: impl IntoIterator<Item = Step>) {
        self.state().script.extend(steps)
    }

    /// Messages written by the host, in order
    pub fn written(&self) -> Vec<Message> {
        self.state().written.clone()
    }

    /// Kinds of messages written by the host, in order
    pub fn written_kinds(&self) -> Vec<MessageKind> {
        self.state().written.iter().map(|m| m.kind).collect()
    }

    /// Number of connections opened
    pub fn connects(&self) -> usize {
        self.state().connects
    }

    /// Number of connections closed
    pub fn closes(&self) -> usize {
        self.state().closes
    }

    /// Largest number of simultaneously open connections
    pub fn max_open(&self) -> usize {
        self.state().max_open
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.state().script.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(s) => s,
            Err(p) => p.into_inner(),
        }
    }
}

#[async_trait]
impl Connect for MockDevice {
    type Channel = MockChannel;

    async fn connect(&self) -> Result<MockChannel, Error> {
        if !self.available {
            return Err(Error::NoDevice(self.device_type));
        }

        let mut s = self.state();
        s.connects += 1;
        s.open += 1;
        s.max_open = s.max_open.max(s.open);

        debug!("Mock connect #{}", s.connects);

        Ok(MockChannel {
            device: self.clone(),
            decoder: Decoder::new(),
            incoming: VecDeque::new(),
            stalled: false,
            closed: false,
        })
    }

    async fn available(&self) -> bool {
        self.available
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }
}

/// Connection to a [MockDevice]
pub struct MockChannel {
    device: MockDevice,
    decoder: Decoder,
    /// Response frames awaiting read
    incoming: VecDeque<Frame>,
    stalled: bool,
    closed: bool,
}

impl MockChannel {
    /// Handle a complete message from the host
    fn received(&mut self, m: Message) -> Result<(), Error> {
        let mut s = self.device.state();

        let kind = m.kind;
        s.written.push(m);

        if kind == MessageKind::SimulateButtonPress {
            return Ok(());
        }

        match s.script.pop_front() {
            Some(Step::Reply(r)) => {
                debug!("Mock received {}, replying {}", kind, r.kind);
                self.incoming.extend(r.to_frames()?);
            }
            Some(Step::Silent) => debug!("Mock received {}, no reply", kind),
            Some(Step::Stall) => {
                debug!("Mock received {}, stalling", kind);
                self.stalled = true;
            }
            // Unscripted messages are left unanswered
            None => debug!("Mock received unscripted {}", kind),
        }

        Ok(())
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Disconnected);
        }

        if let Some(m) = self.decoder.push(frame)? {
            self.received(m)?;
        }

        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
        if self.closed {
            return Err(Error::Disconnected);
        }

        match self.incoming.pop_front() {
            Some(f) => Ok(f.to_vec()),
            None if self.stalled => std::future::pending().await,
            None => Err(Error::Disconnected),
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut s = self.device.state();
        s.closes += 1;
        s.open -= 1;
    }

    fn is_emulator(&self) -> bool {
        self.device.device_type == DeviceType::Emulator
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        // Connections dropped without closing still release the device
        if !self.closed {
            self.device.state().open -= 1;
        }
    }
}

#[cfg(test)]
mod test {
    use skywallet::transport::{read_message, write_message};
    use skywallet_proto::messages;

    use super::*;
    use crate::responses::*;

    #[tokio::test]
    async fn replies_follow_script() -> anyhow::Result<()> {
        let d = MockDevice::new([success("pong").into(), Step::Silent]);
        let mut c = d.connect().await?;

        let ping = Message::from_payload(&messages::Ping::default());

        write_message(&mut c, &ping).await?;
        assert_eq!(read_message(&mut c).await?, success("pong"));

        // Silent steps leave nothing to read
        write_message(&mut c, &ping).await?;
        assert!(matches!(
            read_message(&mut c).await,
            Err(Error::Disconnected)
        ));

        c.close().await;

        assert_eq!(d.written_kinds(), vec![MessageKind::Ping, MessageKind::Ping]);
        assert_eq!((d.connects(), d.closes()), (1, 1));

        Ok(())
    }

    #[tokio::test]
    async fn button_presses_do_not_consume_steps() -> anyhow::Result<()> {
        let d = MockDevice::new([success("ok").into()]);
        let mut c = d.connect().await?;

        let press = Message::from_payload(&messages::SimulateButtonPress {
            button_type: Some(0),
        });
        write_message(&mut c, &press).await?;

        assert_eq!(d.remaining(), 1);
        assert_eq!(d.written_kinds(), vec![MessageKind::SimulateButtonPress]);

        Ok(())
    }
}
