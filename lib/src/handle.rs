// Copyright (c) 2022-2023 The Skycoin Project

//! Session controller for Skywallet devices
//!
//! [DeviceHandle] serialises operations against a single device,
//! connecting a fresh channel for each operation and closing it on every
//! exit path. Operations that stop on a caller prompt are resumed with
//! a later call (see [DeviceHandle::resume]), the handle only remembers
//! which prompt is pending, the device holds the rest of the conversation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use futures::future::BoxFuture;
use log::{debug, warn};
use tokio::sync::{oneshot, Mutex, MutexGuard};

use skywallet_core::engine::{
    Answer, Event, Operation, OperationKind, Outcome, Output, Prompt, TxInput, TxOutput,
};
use skywallet_proto::{messages, ButtonType, Message, MessageKind};

use crate::{
    transport::{read_message, write_message, Channel},
    Connect, DeviceType, Error,
};

/// Session options, fixed when the handle is created
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SessionConfig {
    /// Acknowledge button requests without surfacing them to the caller
    pub auto_ack_buttons: bool,

    /// Follow each `ButtonAck` with a simulated button press (emulator only)
    pub auto_press: Option<ButtonType>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_ack_buttons: true,
            auto_press: None,
        }
    }
}

/// Prompt left pending by the last operation
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Pending {
    pub operation: OperationKind,
    pub prompt: Prompt,
}

/// Device session state, guarded by the session lock
#[derive(Clone, Debug, Default)]
pub struct Session {
    pending: Option<Pending>,
}

impl Session {
    /// Fetch the pending prompt (if any)
    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }
}

/// Result of driving an operation until it needs the caller
#[derive(Clone, PartialEq, Debug)]
pub enum Reply {
    /// Device is waiting on a prompt, continue with [DeviceHandle::resume]
    Prompt(Prompt),
    /// Operation complete
    Done(Outcome),
}

/// Owner of handles not created via [DeviceHandle::scoped]
const UNSCOPED: u64 = 0;

/// Abort signal for the in-flight operation
struct Abort {
    /// Scope of the handle that started the operation
    owner: u64,
    tx: oneshot::Sender<()>,
}

type AbortSlot = std::sync::Mutex<Option<Abort>>;

/// Skywallet handle for a device reached through a [Connect] implementation
pub struct DeviceHandle<C: Connect> {
    connector: Arc<C>,
    config: SessionConfig,

    /// Single slot session lock
    session: Arc<Mutex<Session>>,
    /// Aborts the in-flight operation (set while the session is held)
    abort: Arc<AbortSlot>,

    /// Scope counter shared by all clones
    scopes: Arc<AtomicU64>,
    owner: u64,
}

impl<C: Connect> Clone for DeviceHandle<C> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            config: self.config,
            session: self.session.clone(),
            abort: self.abort.clone(),
            scopes: self.scopes.clone(),
            owner: self.owner,
        }
    }
}

/// Create a [DeviceHandle] with the default [SessionConfig]
impl<C: Connect> From<C> for DeviceHandle<C> {
    fn from(c: C) -> Self {
        Self::new(c, SessionConfig::default())
    }
}

impl<C: Connect> DeviceHandle<C> {
    pub fn new(connector: C, config: SessionConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            config,
            session: Arc::new(Mutex::new(Session::default())),
            abort: Arc::new(std::sync::Mutex::new(None)),
            scopes: Arc::new(AtomicU64::new(UNSCOPED + 1)),
            owner: UNSCOPED,
        }
    }

    /// Clone the handle into a new operation scope
    ///
    /// [DeviceHandle::disconnect] on a scoped handle only aborts operations
    /// started through that handle (or its clones), unscoped handles abort
    /// any in-flight operation.
    pub fn scoped(&self) -> Self {
        let mut h = self.clone();
        h.owner = self.scopes.fetch_add(1, Ordering::Relaxed);
        h
    }

    /// Fetch the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fetch the configured device type
    pub fn device_type(&self) -> DeviceType {
        self.connector.device_type()
    }

    /// Fetch the pending prompt, `None` if none is pending or the session is busy
    pub fn pending(&self) -> Option<Pending> {
        self.session.try_lock().ok().and_then(|s| s.pending)
    }

    /// Run `f` with exclusive access to a freshly connected channel
    ///
    /// Fails immediately with [Error::Busy] if another operation holds the
    /// session. The channel is closed whatever the outcome.
    pub async fn with_exclusive_session<R, F>(&self, f: F) -> Result<R, Error>
    where
        F: for<'a> FnOnce(&'a mut C::Channel) -> BoxFuture<'a, Result<R, Error>> + Send,
        R: Send,
    {
        let _session = self.acquire()?;
        self.exclusive(f).await
    }

    /// Force-close the in-flight operation's channel
    ///
    /// The in-flight operation fails with [Error::Disconnected].
    /// Returns `false` if no operation was in flight, or the in-flight
    /// operation belongs to another scope (see [DeviceHandle::scoped]).
    pub fn disconnect(&self) -> bool {
        let mut slot = abort_slot(&self.abort);

        match slot.take() {
            Some(a) if self.owner == UNSCOPED || a.owner == self.owner => {
                debug!("Disconnecting in-flight operation");
                let _ = a.tx.send(());
                true
            }
            Some(a) => {
                *slot = Some(a);
                false
            }
            None => false,
        }
    }

    /// Check whether a device is connected and responding
    ///
    /// A busy session is in use by a connected device.
    pub async fn connected(&self) -> bool {
        let r = self
            .with_exclusive_session(|c| {
                Box::pin(async move {
                    let mut op = Operation::connected();
                    drive(c, &mut op, Event::Start, None).await
                })
            })
            .await;

        match r {
            Ok(Reply::Done(Outcome::Success(_))) | Err(Error::Busy) => true,
            Ok(_) => false,
            Err(e) => {
                debug!("Connection check failed: {}", e);
                false
            }
        }
    }

    /// Check whether a device is present, without connecting
    pub async fn available(&self) -> bool {
        self.connector.available().await
    }

    /// Cancel any in-flight or pending operation
    ///
    /// In-flight operations are disconnected, then `Cancel` is sent to reset
    /// the device conversation.
    pub async fn cancel(&self) -> Result<Reply, Error> {
        debug!("Requesting cancel");

        self.disconnect();

        let mut session = self.session.lock().await;
        session.pending = None;

        self.exclusive(|c| {
            Box::pin(async move {
                let mut op = Operation::cancel();
                drive(c, &mut op, Event::Start, None).await
            })
        })
        .await
    }

    /// Run an operation, returning its outcome or the prompt it stopped on
    pub async fn run(&self, op: Operation) -> Result<Reply, Error> {
        let mut session = self.acquire()?;

        let mut op = op.with_auto_ack(self.config.auto_ack_buttons);
        let kind = op.kind();
        let auto_press = self.config.auto_press;

        // Starting a new operation abandons any pending prompt
        if let Some(p) = session.pending.take() {
            debug!("Abandoning pending {} for {}", p.prompt, p.operation);
        }

        let r = self
            .exclusive(move |c| {
                Box::pin(async move { drive(c, &mut op, Event::Start, auto_press).await })
            })
            .await;

        session.pending = pending(kind, &r);

        r
    }

    /// Resume the pending operation with the caller's answer
    ///
    /// Fails with [Error::NoPendingPrompt] (without device I/O) if the answer
    /// does not match the pending prompt.
    pub async fn resume(&self, answer: Answer) -> Result<Reply, Error> {
        let mut session = self.acquire()?;

        let prompt = answer.prompt();
        let kind = match session.pending {
            Some(p) if p.prompt == prompt => p.operation,
            _ => return Err(Error::NoPendingPrompt(prompt)),
        };

        debug!("Resuming {} with {}", kind, prompt);

        let mut op =
            Operation::continuation(kind, prompt).with_auto_ack(self.config.auto_ack_buttons);
        let auto_press = self.config.auto_press;

        let r = self
            .exclusive(move |c| {
                Box::pin(async move { drive(c, &mut op, Event::Resume(answer), auto_press).await })
            })
            .await;

        session.pending = pending(kind, &r);

        r
    }

    /// Generate `address_n` addresses starting from `start_index`
    pub async fn address_gen(
        &self,
        address_n: u32,
        start_index: u32,
        confirm_address: bool,
    ) -> Result<Reply, Error> {
        debug!(
            "Requesting {} addresses from index {} (confirm: {})",
            address_n, start_index, confirm_address
        );

        self.run(Operation::address_gen(address_n, start_index, confirm_address))
            .await
    }

    /// Apply device settings
    pub async fn apply_settings(
        &self,
        label: Option<String>,
        use_passphrase: Option<bool>,
        language: Option<String>,
    ) -> Result<Reply, Error> {
        debug!("Requesting apply settings");

        self.run(Operation::apply_settings(label, use_passphrase, language))
            .await
    }

    /// Start a seed backup
    pub async fn backup(&self) -> Result<Reply, Error> {
        debug!("Requesting backup");
        self.run(Operation::backup()).await
    }

    /// Configure (or remove) the device PIN
    pub async fn change_pin(&self, remove: bool) -> Result<Reply, Error> {
        debug!("Requesting PIN change (remove: {})", remove);
        self.run(Operation::change_pin(remove)).await
    }

    /// Check a message signature against an address
    pub async fn check_message_signature(
        &self,
        address: String,
        message: String,
        signature: String,
    ) -> Result<Reply, Error> {
        debug!("Requesting signature check for address: {}", address);

        self.run(Operation::check_message_signature(address, message, signature))
            .await
    }

    /// Fetch device features
    pub async fn features(&self) -> Result<Reply, Error> {
        debug!("Requesting features");
        self.run(Operation::features()).await
    }

    /// Update device firmware (USB devices only)
    pub async fn firmware_update(&self, payload: Vec<u8>) -> Result<Reply, Error> {
        let device_type = self.device_type();
        if device_type != DeviceType::Usb {
            return Err(Error::Unsupported(OperationKind::FirmwareUpdate, device_type));
        }

        debug!("Requesting firmware update ({} bytes)", payload.len());

        self.run(Operation::firmware_update(payload)).await
    }

    /// Generate a new device seed
    pub async fn generate_mnemonic(
        &self,
        word_count: u32,
        use_passphrase: bool,
    ) -> Result<Reply, Error> {
        debug!("Requesting {} word mnemonic generation", word_count);

        self.run(Operation::generate_mnemonic(word_count, use_passphrase))
            .await
    }

    /// Recover a seed from words entered via [Answer::Word] continuations
    pub async fn recovery(
        &self,
        word_count: u32,
        use_passphrase: Option<bool>,
        dry_run: bool,
    ) -> Result<Reply, Error> {
        debug!(
            "Requesting {} word recovery (dry run: {})",
            word_count, dry_run
        );

        self.run(Operation::recovery(word_count, use_passphrase, dry_run))
            .await
    }

    /// Ping the device, a successful reply echoes `message`
    pub async fn ping(&self, message: String, button_protection: bool) -> Result<Reply, Error> {
        debug!("Requesting ping (button protection: {})", button_protection);
        self.run(Operation::ping(message, button_protection)).await
    }

    /// Load a seed onto the device
    pub async fn set_mnemonic(&self, mnemonic: String) -> Result<Reply, Error> {
        debug!("Requesting set mnemonic");
        self.run(Operation::set_mnemonic(mnemonic)).await
    }

    /// Sign a message with the key at `address_n`
    pub async fn sign_message(&self, address_n: u32, message: String) -> Result<Reply, Error> {
        debug!("Requesting message signature with key: {}", address_n);
        self.run(Operation::sign_message(address_n, message)).await
    }

    /// Sign transaction inputs
    pub async fn transaction_sign(
        &self,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
    ) -> Result<Reply, Error> {
        debug!(
            "Requesting transaction signature ({} inputs, {} outputs)",
            inputs.len(),
            outputs.len()
        );

        self.run(Operation::transaction_sign(inputs, outputs)).await
    }

    /// Wipe the device
    pub async fn wipe(&self) -> Result<Reply, Error> {
        debug!("Requesting wipe");
        self.run(Operation::wipe()).await
    }

    /// Answer a pending `PinMatrixRequest`
    pub async fn pin_matrix_ack(&self, pin: String) -> Result<Reply, Error> {
        self.resume(Answer::PinMatrix(pin)).await
    }

    /// Answer a pending `PassphraseRequest`
    pub async fn passphrase_ack(&self, passphrase: String) -> Result<Reply, Error> {
        self.resume(Answer::Passphrase(passphrase)).await
    }

    /// Answer a pending `WordRequest`
    pub async fn word_ack(&self, word: String) -> Result<Reply, Error> {
        self.resume(Answer::Word(word)).await
    }

    /// Answer a pending `ButtonRequest`
    pub async fn button_ack(&self) -> Result<Reply, Error> {
        self.resume(Answer::Button).await
    }

    /// Acquire the session lock without waiting
    fn acquire(&self) -> Result<MutexGuard<'_, Session>, Error> {
        self.session.try_lock().map_err(|_| Error::Busy)
    }

    /// Connect, run `f` racing against [DeviceHandle::disconnect], then close
    ///
    /// Callers must hold the session lock.
    async fn exclusive<R, F>(&self, f: F) -> Result<R, Error>
    where
        F: for<'a> FnOnce(&'a mut C::Channel) -> BoxFuture<'a, Result<R, Error>> + Send,
        R: Send,
    {
        let (tx, rx) = oneshot::channel();
        let mut op = Exclusive::new(
            &self.abort,
            Abort {
                owner: self.owner,
                tx,
            },
        );

        let r = tokio::select! {
            r = async {
                let c = op.channel.insert(self.connector.connect().await?);
                f(c).await
            } => r,
            _ = rx => Err(Error::Disconnected),
        };

        op.close().await;

        r
    }
}

fn abort_slot(slot: &AbortSlot) -> std::sync::MutexGuard<'_, Option<Abort>> {
    match slot.lock() {
        Ok(g) => g,
        Err(p) => p.into_inner(),
    }
}

/// In-flight operation state, released on every exit path
///
/// Dropping an operation before it completes clears the abort slot and
/// closes the channel on a background task.
struct Exclusive<'a, T: Channel + 'static> {
    abort: &'a AbortSlot,
    channel: Option<T>,
}

impl<'a, T: Channel + 'static> Exclusive<'a, T> {
    fn new(abort: &'a AbortSlot, a: Abort) -> Self {
        *abort_slot(abort) = Some(a);

        Self {
            abort,
            channel: None,
        }
    }

    async fn close(&mut self) {
        if let Some(mut c) = self.channel.take() {
            c.close().await;
        }
    }
}

impl<'a, T: Channel + 'static> Drop for Exclusive<'a, T> {
    fn drop(&mut self) {
        abort_slot(self.abort).take();

        let mut c = match self.channel.take() {
            Some(c) => c,
            None => return,
        };

        debug!("Operation dropped in flight, closing channel");

        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move { c.close().await });
            }
            Err(_) => warn!("No runtime available to close channel"),
        }
    }
}

/// Drive an operation over `c` until it completes or needs the caller
async fn drive<T: Channel + ?Sized>(
    c: &mut T,
    op: &mut Operation,
    mut evt: Event,
    auto_press: Option<ButtonType>,
) -> Result<Reply, Error> {
    loop {
        match op.update(evt)? {
            Output::Send(m) => {
                write_message(c, &m).await?;
                press(c, &m, auto_press).await?;

                evt = Event::Response(read_message(c).await?);
            }
            Output::Notify { message, outcome } => {
                write_message(c, &message).await?;
                press(c, &message, auto_press).await?;

                return Ok(Reply::Done(outcome));
            }
            Output::Prompt(p) => return Ok(Reply::Prompt(p)),
            Output::Done(o) => return Ok(Reply::Done(o)),
        }
    }
}

/// Simulate a button press following a `ButtonAck` (emulator only)
async fn press<T: Channel + ?Sized>(
    c: &mut T,
    m: &Message,
    button: Option<ButtonType>,
) -> Result<(), Error> {
    let button = match button {
        Some(b) if m.kind == MessageKind::ButtonAck => b,
        _ => return Ok(()),
    };

    if !c.is_emulator() {
        warn!("Button press simulation requires the emulator");
        return Ok(());
    }

    debug!("Simulating {} button press", button);

    let req = messages::SimulateButtonPress {
        button_type: Some(button as i32),
    };
    write_message(c, &Message::from_payload(&req)).await
}

/// Pending prompt following an operation result
fn pending(operation: OperationKind, r: &Result<Reply, Error>) -> Option<Pending> {
    match r {
        Ok(Reply::Prompt(prompt)) => Some(Pending {
            operation,
            prompt: *prompt,
        }),
        _ => None,
    }
}
