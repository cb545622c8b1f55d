//! The full command surface of the graph store.
//!
//! Every protocol command has a method here. A backend overrides the ones
//! it speaks; the rest answer [`ClientError::Unsupported`] without touching
//! the connection.

use bytes::Bytes;
use scwire_frame::{CommandCode, ElementAddress, EventType, IteratorType, ResultFrame};

use crate::commands::FindResult;
use crate::error::{ClientError, Result};
use crate::handle::ResultHandle;

fn unsupported<T>(code: CommandCode) -> Result<ResultHandle<T>> {
    Err(ClientError::Unsupported(code))
}

/// Element type mask as carried on the wire.
pub type TypeMask = u16;

/// Graph store operations. Each call queues one command and returns a handle
/// to its eventual result.
pub trait GraphStore {
    fn check_element(&self, addr: ElementAddress) -> Result<ResultHandle<bool>> {
        let _ = addr;
        unsupported(CommandCode::CheckElement)
    }

    fn get_element_type(&self, addr: ElementAddress) -> Result<ResultHandle<TypeMask>> {
        let _ = addr;
        unsupported(CommandCode::GetElementType)
    }

    fn erase_element(&self, addr: ElementAddress) -> Result<ResultHandle<bool>> {
        let _ = addr;
        unsupported(CommandCode::EraseElement)
    }

    fn create_node(&self, kind: TypeMask) -> Result<ResultHandle<ElementAddress>> {
        let _ = kind;
        unsupported(CommandCode::CreateNode)
    }

    fn create_link(&self) -> Result<ResultHandle<ElementAddress>> {
        unsupported(CommandCode::CreateLink)
    }

    fn create_arc(
        &self,
        kind: TypeMask,
        begin: ElementAddress,
        end: ElementAddress,
    ) -> Result<ResultHandle<ElementAddress>> {
        let _ = (kind, begin, end);
        unsupported(CommandCode::CreateArc)
    }

    /// Begin and end of an arc.
    fn get_arc(&self, addr: ElementAddress) -> Result<ResultHandle<(ElementAddress, ElementAddress)>> {
        let _ = addr;
        unsupported(CommandCode::GetArc)
    }

    fn get_link_content(&self, addr: ElementAddress) -> Result<ResultHandle<Bytes>> {
        let _ = addr;
        unsupported(CommandCode::GetLinkContent)
    }

    fn set_link_content(&self, addr: ElementAddress, content: &[u8]) -> Result<ResultHandle<bool>> {
        let _ = (addr, content);
        unsupported(CommandCode::SetLinkContent)
    }

    fn find_links_with_content(&self, content: &[u8]) -> Result<ResultHandle<Vec<ElementAddress>>> {
        let _ = content;
        unsupported(CommandCode::FindLinks)
    }

    /// Run a 3- or 5-element iterator. `args` holds addresses or type masks
    /// in template order.
    fn iterate_elements(
        &self,
        kind: IteratorType,
        args: &[u32],
    ) -> Result<ResultHandle<Vec<Vec<ElementAddress>>>> {
        let _ = (kind, args);
        unsupported(CommandCode::IterateElements)
    }

    fn set_system_identifier(&self, idtf: &str, addr: ElementAddress) -> Result<ResultHandle<bool>> {
        let _ = (idtf, addr);
        unsupported(CommandCode::SetSysIdtf)
    }

    /// Subscribe to `kind` events on `addr`. Yields the subscription id.
    fn event_create(&self, kind: EventType, addr: ElementAddress) -> Result<ResultHandle<u32>> {
        let _ = (kind, addr);
        unsupported(CommandCode::EventCreate)
    }

    fn event_destroy(&self, id: u32) -> Result<ResultHandle<bool>> {
        let _ = id;
        unsupported(CommandCode::EventDestroy)
    }

    fn statistics(&self, begin_time: u64, end_time: u64) -> Result<ResultHandle<ResultFrame>> {
        let _ = (begin_time, end_time);
        unsupported(CommandCode::Statistics)
    }

    fn find_element_by_system_identifier(&self, idtf: &str) -> Result<ResultHandle<FindResult>> {
        let _ = idtf;
        unsupported(CommandCode::FindElementBySysIdtf)
    }

    /// Drain queued events. Yields the number of callbacks invoked.
    fn event_emit(&self) -> Result<ResultHandle<usize>> {
        unsupported(CommandCode::EventEmit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl GraphStore for Bare {}

    #[test]
    fn defaults_are_unsupported() {
        let store = Bare;
        let addr = ElementAddress::new(1, 2);

        let codes = [
            store.check_element(addr).map(drop).unwrap_err(),
            store.create_arc(0, addr, addr).map(drop).unwrap_err(),
            store.iterate_elements(IteratorType::Iter3FAA, &[1, 2, 3]).map(drop).unwrap_err(),
            store.event_create(EventType::AddOutputArc, addr).map(drop).unwrap_err(),
            store.statistics(0, 1).map(drop).unwrap_err(),
            store.event_emit().map(drop).unwrap_err(),
        ];
        let expected = [
            CommandCode::CheckElement,
            CommandCode::CreateArc,
            CommandCode::IterateElements,
            CommandCode::EventCreate,
            CommandCode::Statistics,
            CommandCode::EventEmit,
        ];
        for (err, code) in codes.iter().zip(expected) {
            assert!(matches!(err, ClientError::Unsupported(c) if *c == code), "{err}");
        }
    }
}
