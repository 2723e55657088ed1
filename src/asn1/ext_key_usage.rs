// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ExtKeyUsageSyntax`, RFC 5280 §4.2.1.12.
//!
//! ```ASN.1
//! ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
//! KeyPurposeId ::= OBJECT IDENTIFIER
//! ```

use crate::oid::OID_ANY_EXTENDED_KEY_USAGE;
use bcder::{
    decode::{Constructed, DecodeError, Source},
    encode,
    encode::Values,
    Mode, Oid,
};
use std::io::Write;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtKeyUsageSyntax(Vec<Oid>);

impl ExtKeyUsageSyntax {
    /// Builds a syntax from `purposes`. If empty, the reserved placeholder
    /// OID is substituted, since the grammar requires at least one element.
    pub fn new(purposes: Vec<Oid>) -> Self {
        if purposes.is_empty() {
            Self(vec![Oid(OID_ANY_EXTENDED_KEY_USAGE.0.into())])
        } else {
            Self(purposes)
        }
    }

    pub fn oids(&self) -> &[Oid] {
        &self.0
    }

    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut purposes = Vec::new();
            while let Some(oid) = Oid::take_opt_from(cons)? {
                purposes.push(oid);
            }
            if purposes.is_empty() {
                return Err(cons.content_err("ExtKeyUsageSyntax requires at least one OID"));
            }
            Ok(Self(purposes))
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::sequence(self.0.iter().map(|oid| oid.encode_ref()).collect::<Vec<_>>())
    }
}

impl Values for ExtKeyUsageSyntax {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.encode_ref().encoded_len(mode)
    }

    fn write_encoded<W: Write>(&self, mode: Mode, target: &mut W) -> Result<(), std::io::Error> {
        self.encode_ref().write_encoded(mode, target)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bcder::decode::BytesSource;
    use bytes::Bytes;

    #[test]
    fn empty_purposes_become_placeholder() {
        let syntax = ExtKeyUsageSyntax::new(vec![]);
        assert_eq!(syntax.oids().len(), 1);
    }

    #[test]
    fn round_trips_through_der() {
        let syntax =
            ExtKeyUsageSyntax::new(vec![Oid(OID_ANY_EXTENDED_KEY_USAGE.0.into())]);
        let captured = bcder::Captured::from_values(Mode::Der, syntax.encode_ref());
        let source = BytesSource::new(Bytes::copy_from_slice(captured.as_slice()));
        let decoded =
            Constructed::decode(source, Mode::Der, |cons| ExtKeyUsageSyntax::take_from(cons))
                .unwrap();
        assert_eq!(decoded, syntax);
    }
}
