//! Shared message builders for the zonesync integration tests.

#![allow(dead_code)] // not every test file uses every builder

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::{A, SOA};
use hickory_proto::rr::{Name, RData, Record, RecordType};

/// Build a NOTIFY message announcing a new SOA for `domain`.
pub fn notify_message(domain: &str) -> Message {
    let name = fqdn(domain);
    let soa = SOA::new(
        fqdn(&format!("ns1.{domain}")),
        fqdn(&format!("hostmaster.{domain}")),
        2024010101,
        3600,
        900,
        604800,
        300,
    );

    let mut msg = Message::new();
    msg.set_id(1234)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Notify)
        .set_authoritative(true);
    msg.add_query(Query::query(name.clone(), RecordType::SOA));
    msg.add_answer(Record::from_rdata(name, 3600, RData::SOA(soa)));
    msg
}

/// A NOTIFY that carries no answer records at all.
pub fn notify_without_answers(domain: &str) -> Message {
    let mut msg = Message::new();
    msg.set_id(1234)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Notify);
    msg.add_query(Query::query(fqdn(domain), RecordType::SOA));
    msg
}

/// A NOTIFY whose first answer is an A record instead of an SOA.
pub fn notify_with_a_record(domain: &str) -> Message {
    let name = fqdn(domain);

    let mut msg = Message::new();
    msg.set_id(1234)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Notify);
    msg.add_query(Query::query(name.clone(), RecordType::SOA));
    msg.add_answer(Record::from_rdata(
        name,
        3600,
        RData::A(A::new(192, 0, 2, 1)),
    ));
    msg
}

/// An ordinary query, not a NOTIFY.
pub fn query_message(domain: &str) -> Message {
    let mut msg = Message::new();
    msg.set_id(1234)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    msg.add_query(Query::query(fqdn(domain), RecordType::SOA));
    msg
}

fn fqdn(domain: &str) -> Name {
    let name = format!("{domain}.");
    Name::from_ascii(&name).expect("test domain is a valid name")
}
