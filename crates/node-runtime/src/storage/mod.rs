pub mod rocksdb_adapter;
