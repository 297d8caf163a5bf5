use huffman_file::container;
use std::env;
use std::fs::{self, File};

fn main() {
    let fp = env::args().nth(1).expect("Please provide path to input file as first argument.");
    let input_bytes = fs::read(&fp).expect("First argument was not a valid filepath.");

    let dir = tempfile::tempdir().unwrap();
    let encoded = dir.path().join("encoded.huff");
    let decoded = dir.path().join("decoded.txt");

    // encode scope - save to file
    {
        let stats = huffman_file::compress_to(&fp, &encoded).unwrap();
        println!("{stats:?}");
    }

    // decode scope - read from file
    {
        let summary = container::inspect(File::open(&encoded).unwrap()).unwrap();
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());

        huffman_file::decompress_to(&encoded, &decoded).unwrap();
        assert_eq!(fs::read(&decoded).unwrap(), input_bytes);
    }
}
