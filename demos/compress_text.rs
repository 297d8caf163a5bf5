use huffman_file::{decode, encode};

fn main() {
    let s = String::from("Hello my name is Sam!");
    let container = encode(s.as_bytes()).unwrap();
    let dec = String::from_utf8(decode(&container).unwrap());

    println!("{} bytes -> {} bytes", s.len(), container.len());
    println!("{:?}", dec);
}
