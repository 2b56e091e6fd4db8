//! Outbound customer messaging. The only channel is a WhatsApp deep link;
//! the service never delivers the message itself.

pub mod whatsapp;
