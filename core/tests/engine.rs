// Copyright (c) 2022-2023 The Skycoin Project

use skywallet_core::{
    engine::{Answer, Error, Event, Operation, Outcome, Output, Prompt, State, TxInput, TxOutput},
    proto::{messages, FailureCode, Message, MessageKind},
};

mod helpers;
use helpers::*;

/// Fetch the message from a [Output::Send]
fn sent(o: Output) -> Message {
    match o {
        Output::Send(m) => m,
        _ => panic!("expected send, got {o:?}"),
    }
}

#[test]
fn button_requests_are_acknowledged() -> anyhow::Result<()> {
    let mut op = Operation::sign_message(0, "hello".to_string());

    let req = sent(op.update(Event::Start)?);
    assert_eq!(req.kind, MessageKind::SkycoinSignMessage);

    // Two button prompts, each acknowledged without surfacing
    for _ in 0..2 {
        let ack = sent(op.update(Event::Response(prompt(MessageKind::ButtonRequest)))?);
        assert_eq!(ack.kind, MessageKind::ButtonAck);
        assert_eq!(op.state(), State::Resumed(Prompt::ButtonRequest));
    }

    let o = op.update(Event::Response(success("ok")))?;
    assert_eq!(o, Output::Done(Outcome::Success("ok".to_string())));
    assert!(op.is_terminal());

    Ok(())
}

#[test]
fn button_requests_surface_when_configured() -> anyhow::Result<()> {
    let mut op = Operation::address_gen(2, 0, true).with_auto_ack(false);
    op.update(Event::Start)?;

    let o = op.update(Event::Response(prompt(MessageKind::ButtonRequest)))?;
    assert_eq!(o, Output::Prompt(Prompt::ButtonRequest));

    let ack = sent(op.update(Event::Resume(Answer::Button))?);
    assert_eq!(ack.kind, MessageKind::ButtonAck);

    let addresses = Message::from_payload(&messages::ResponseSkycoinAddress {
        addresses: vec!["a".to_string(), "b".to_string()],
    });
    let o = op.update(Event::Response(addresses))?;
    assert_eq!(
        o,
        Output::Done(Outcome::Addresses(vec!["a".to_string(), "b".to_string()]))
    );

    Ok(())
}

#[test]
fn some_operations_always_acknowledge_buttons() -> anyhow::Result<()> {
    let mut op = Operation::set_mnemonic("abandon".to_string()).with_auto_ack(false);
    op.update(Event::Start)?;

    let ack = sent(op.update(Event::Response(prompt(MessageKind::ButtonRequest)))?);
    assert_eq!(ack.kind, MessageKind::ButtonAck);

    Ok(())
}

#[test]
fn recovery_word_chain() -> anyhow::Result<()> {
    let mut op = Operation::recovery(12, None, false);
    op.update(Event::Start)?;

    let mut o = op.update(Event::Response(prompt(MessageKind::WordRequest)))?;

    for i in 0..12 {
        assert_eq!(o, Output::Prompt(Prompt::WordRequest));

        let ack = sent(op.update(Event::Resume(Answer::Word(format!("word{i}"))))?);
        assert_eq!(
            ack.decode::<messages::WordAck>()?.word,
            format!("word{i}")
        );

        let resp = match i {
            11 => success("Device recovered"),
            _ => prompt(MessageKind::WordRequest),
        };
        o = op.update(Event::Response(resp))?;
    }

    assert_eq!(o, Output::Done(Outcome::Success("Device recovered".to_string())));

    // Further answers are rejected
    assert!(matches!(
        op.update(Event::Resume(Answer::Word("extra".to_string()))),
        Err(Error::Terminated)
    ));

    Ok(())
}

#[test]
fn entropy_request_resends_original() -> anyhow::Result<()> {
    let mut op = Operation::generate_mnemonic(12, false);

    let req = sent(op.update(Event::Start)?);
    assert_eq!(req.kind, MessageKind::GenerateMnemonic);

    // Entropy is supplied by the host
    let ack = sent(op.update(Event::Response(prompt(MessageKind::EntropyRequest)))?);
    let entropy = ack.decode::<messages::EntropyAck>()?.entropy.unwrap_or_default();
    assert_eq!(entropy.len(), 32);

    // Response to the entropy ack is discarded and the request resent
    let resent = sent(op.update(Event::Response(success("entropy set")))?);
    assert_eq!(resent, req);

    let o = op.update(Event::Response(success("Mnemonic successfully configured")))?;
    assert_eq!(
        o,
        Output::Done(Outcome::Success(
            "Mnemonic successfully configured".to_string()
        ))
    );

    Ok(())
}

#[test]
fn entropy_ack_failure_is_terminal() -> anyhow::Result<()> {
    let mut op = Operation::generate_mnemonic(24, false);
    op.update(Event::Start)?;
    op.update(Event::Response(prompt(MessageKind::EntropyRequest)))?;

    let o = op.update(Event::Response(failure(9, "entropy rejected")))?;
    assert!(matches!(o, Output::Done(Outcome::Failure { code: 9, .. })));

    Ok(())
}

#[test]
fn initialize_preamble_is_discarded() -> anyhow::Result<()> {
    let mut op = Operation::wipe();

    let init = sent(op.update(Event::Start)?);
    assert_eq!(init.kind, MessageKind::Initialize);

    let features = Message::from_payload(&messages::Features::default());
    let wipe = sent(op.update(Event::Response(features))?);
    assert_eq!(wipe.kind, MessageKind::WipeDevice);

    let ack = sent(op.update(Event::Response(prompt(MessageKind::ButtonRequest)))?);
    assert_eq!(ack.kind, MessageKind::ButtonAck);

    let o = op.update(Event::Response(success("Device wiped")))?;
    assert_eq!(o, Output::Done(Outcome::Success("Device wiped".to_string())));

    Ok(())
}

#[test]
fn firmware_update_steps() -> anyhow::Result<()> {
    let mut op = Operation::firmware_update(vec![0xab; 300]);

    assert_eq!(sent(op.update(Event::Start)?).kind, MessageKind::Initialize);

    let erase = sent(op.update(Event::Response(prompt(MessageKind::Features)))?);
    assert_eq!(erase.decode::<messages::FirmwareErase>()?.length, Some(300));

    let upload = sent(op.update(Event::Response(success("Firmware erased")))?);
    let u = upload.decode::<messages::FirmwareUpload>()?;
    assert_eq!(u.payload.len(), 300);
    assert_eq!(u.hash.map(|h| h.len()), Some(32));

    // Final acknowledgement is written without awaiting a response
    match op.update(Event::Response(success("Upload complete")))? {
        Output::Notify { message, outcome } => {
            assert_eq!(message.kind, MessageKind::ButtonAck);
            assert_eq!(outcome, Outcome::Success("Upload complete".to_string()));
        }
        o => panic!("unexpected output: {o:?}"),
    }

    Ok(())
}

#[test]
fn failure_is_terminal() -> anyhow::Result<()> {
    let mut op = Operation::generate_mnemonic(12, false);
    op.update(Event::Start)?;

    let o = op.update(Event::Response(failure(11, "failure msg")))?;
    let expected = Outcome::Failure {
        code: 11,
        message: "failure msg".to_string(),
    };
    assert_eq!(o, Output::Done(expected.clone()));
    assert_eq!(expected.failure_code(), Some(FailureCode::NotInitialized));

    assert!(matches!(
        op.update(Event::Response(success("late"))),
        Err(Error::Terminated)
    ));

    Ok(())
}

#[test]
fn unexpected_message_is_an_error() -> anyhow::Result<()> {
    let mut op = Operation::features();
    op.update(Event::Start)?;

    let r = op.update(Event::Response(prompt(MessageKind::Initialize)));
    assert!(matches!(
        r,
        Err(Error::UnexpectedMessage(MessageKind::Initialize))
    ));
    assert!(op.is_terminal());

    Ok(())
}

#[test]
fn mismatched_answer_is_rejected() -> anyhow::Result<()> {
    let mut op = Operation::change_pin(false);
    op.update(Event::Start)?;
    op.update(Event::Response(prompt(MessageKind::PinMatrixRequest)))?;

    let r = op.update(Event::Resume(Answer::Word("nope".to_string())));
    assert!(matches!(
        r,
        Err(Error::UnexpectedAnswer {
            expected: Prompt::PinMatrixRequest,
            actual: Prompt::WordRequest
        })
    ));

    // Still waiting on the original prompt
    assert_eq!(op.state(), State::AwaitingPrompt(Prompt::PinMatrixRequest));

    let ack = sent(op.update(Event::Resume(Answer::PinMatrix("1234".to_string())))?);
    assert_eq!(ack.decode::<messages::PinMatrixAck>()?.pin, "1234");

    Ok(())
}

#[test]
fn continuation_resumes_pending_prompt() -> anyhow::Result<()> {
    let mut op = Operation::continuation(
        skywallet_core::engine::OperationKind::Recovery,
        Prompt::WordRequest,
    );

    // Responses are not valid before the prompt is answered
    assert!(matches!(
        op.update(Event::Response(success("early"))),
        Err(Error::UnexpectedEvent(_))
    ));

    let ack = sent(op.update(Event::Resume(Answer::Word("abandon".to_string())))?);
    assert_eq!(ack.kind, MessageKind::WordAck);

    let o = op.update(Event::Response(prompt(MessageKind::WordRequest)))?;
    assert_eq!(o, Output::Prompt(Prompt::WordRequest));

    Ok(())
}

#[test]
fn ping_echoes_message() -> anyhow::Result<()> {
    let mut op = Operation::ping("hello".to_string(), true);

    let req = sent(op.update(Event::Start)?);
    assert_eq!(req.kind, MessageKind::Ping);
    assert_eq!(
        req.decode::<messages::Ping>()?,
        messages::Ping {
            message: Some("hello".to_string()),
            button_protection: Some(true),
        }
    );

    let ack = sent(op.update(Event::Response(prompt(MessageKind::ButtonRequest)))?);
    assert_eq!(ack.kind, MessageKind::ButtonAck);

    let o = op.update(Event::Response(success("hello")))?;
    assert_eq!(o, Output::Done(Outcome::Success("hello".to_string())));

    Ok(())
}

#[test]
fn backup_acknowledges_each_word_page() -> anyhow::Result<()> {
    let mut op = Operation::backup().with_auto_ack(false);

    let init = sent(op.update(Event::Start)?);
    assert_eq!(init.kind, MessageKind::Initialize);

    let features = Message::from_payload(&messages::Features::default());
    let backup = sent(op.update(Event::Response(features))?);
    assert_eq!(backup.kind, MessageKind::BackupDevice);

    for _ in 0..3 {
        let ack = sent(op.update(Event::Response(prompt(MessageKind::ButtonRequest)))?);
        assert_eq!(ack.kind, MessageKind::ButtonAck);
    }

    let o = op.update(Event::Response(success("Seed successfully backed up")))?;
    assert!(matches!(o, Output::Done(Outcome::Success(_))));
    assert!(op.is_terminal());

    Ok(())
}

#[test]
fn transaction_sign_returns_signatures() -> anyhow::Result<()> {
    let inputs = vec![TxInput {
        hash: "181bd5656115172fe81451fae4fb56498a97744d89702e73da75ba91ed5200f9".to_string(),
        index: 0,
    }];
    let outputs = vec![
        TxOutput {
            address: "K9TzLrgqz7uXn3QJHGxmzdRByAzH33J2ot".to_string(),
            coins: 100_000,
            hours: 2,
            address_index: None,
        },
        TxOutput {
            address: "2EVNa4CK9SKosT4j1GEn8SuuUUEAXaHAMbM".to_string(),
            coins: 900_000,
            hours: 2,
            address_index: Some(0),
        },
    ];

    let mut op = Operation::transaction_sign(inputs, outputs);

    let req = sent(op.update(Event::Start)?);
    let tx = req.decode::<messages::TransactionSign>()?;
    assert_eq!(tx.nb_in, 1);
    assert_eq!(tx.nb_out, 2);
    assert_eq!(tx.transaction_in[0].index, Some(0));
    assert_eq!(tx.transaction_out[1].address_index, Some(0));

    let signatures = Message::from_payload(&messages::ResponseTransactionSign {
        signatures: vec!["aa".to_string()],
    });
    let o = op.update(Event::Response(signatures))?;
    assert_eq!(o, Output::Done(Outcome::Signatures(vec!["aa".to_string()])));

    Ok(())
}
