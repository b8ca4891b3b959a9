//! GMX EventEmitter ABI.
//!
//! Every GMX v2 event is logged through one of the emitter's generic
//! `EventLog*` events, carrying the event name as a string and its payload
//! as typed arrays of `{key, value}` pairs. Position increases/decreases are
//! emitted as `EventLog1` with the account as `topic1`.

use alloy::sol;

sol! {
    #[derive(Debug)]
    struct AddressKeyValue { string key; address value; }
    #[derive(Debug)]
    struct AddressArrayKeyValue { string key; address[] value; }
    #[derive(Debug)]
    struct AddressItems { AddressKeyValue[] items; AddressArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct UintKeyValue { string key; uint256 value; }
    #[derive(Debug)]
    struct UintArrayKeyValue { string key; uint256[] value; }
    #[derive(Debug)]
    struct UintItems { UintKeyValue[] items; UintArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct IntKeyValue { string key; int256 value; }
    #[derive(Debug)]
    struct IntArrayKeyValue { string key; int256[] value; }
    #[derive(Debug)]
    struct IntItems { IntKeyValue[] items; IntArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct BoolKeyValue { string key; bool value; }
    #[derive(Debug)]
    struct BoolArrayKeyValue { string key; bool[] value; }
    #[derive(Debug)]
    struct BoolItems { BoolKeyValue[] items; BoolArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct Bytes32KeyValue { string key; bytes32 value; }
    #[derive(Debug)]
    struct Bytes32ArrayKeyValue { string key; bytes32[] value; }
    #[derive(Debug)]
    struct Bytes32Items { Bytes32KeyValue[] items; Bytes32ArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct BytesKeyValue { string key; bytes value; }
    #[derive(Debug)]
    struct BytesArrayKeyValue { string key; bytes[] value; }
    #[derive(Debug)]
    struct BytesItems { BytesKeyValue[] items; BytesArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct StringKeyValue { string key; string value; }
    #[derive(Debug)]
    struct StringArrayKeyValue { string key; string[] value; }
    #[derive(Debug)]
    struct StringItems { StringKeyValue[] items; StringArrayKeyValue[] arrayItems; }

    #[derive(Debug)]
    struct EventLogData {
        AddressItems addressItems;
        UintItems uintItems;
        IntItems intItems;
        BoolItems boolItems;
        Bytes32Items bytes32Items;
        BytesItems bytesItems;
        StringItems stringItems;
    }

    #[derive(Debug)]
    event EventLog1(
        address msgSender,
        string eventName,
        string indexed eventNameHash,
        bytes32 indexed topic1,
        EventLogData eventData
    );
}

pub const POSITION_INCREASE: &str = "PositionIncrease";
pub const POSITION_DECREASE: &str = "PositionDecrease";
