use std::io::BufRead;

use vmm::{error::Result, VirtualAddress, VmError};

/// Yields one virtual address per non-blank input line. Ends after the
/// first read failure.
pub struct AddressReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
    failed: bool,
}

impl<R: BufRead> AddressReader<R> {
    pub fn new(input: R) -> Self {
        AddressReader {
            lines: input.lines(),
            line_number: 0,
            failed: false,
        }
    }

    fn parse(&self, line: &str) -> Result<VirtualAddress> {
        let raw: u32 = line.parse().map_err(|_| {
            VmError::malformed(line, format!("line {} is not an unsigned integer", self.line_number))
        })?;

        VirtualAddress::new(raw).map_err(|err| match err {
            VmError::MalformedAddress { input, reason } => VmError::MalformedAddress {
                input,
                reason: format!("line {}: {}", self.line_number, reason),
            },
            other => other,
        })
    }
}

impl<R: BufRead> Iterator for AddressReader<R> {
    type Item = Result<VirtualAddress>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = self.lines.next()?;
            self.line_number += 1;

            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    self.failed = true;
                    return Some(Err(VmError::InputUnreadable {
                        line: self.line_number,
                        source,
                    }));
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            return Some(self.parse(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufReader, Read};

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    fn read(input: &str) -> Vec<Result<VirtualAddress>> {
        AddressReader::new(input.as_bytes()).collect()
    }

    #[test]
    fn parses_one_address_per_line() {
        let addresses: Vec<u32> = read("16916\n62493\r\n  30198 \n")
            .into_iter()
            .map(|a| a.unwrap().raw())
            .collect();

        assert_eq!(addresses, vec![16916, 62493, 30198]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(read("\n\n1\n\n").len(), 1);
        assert!(read("").is_empty());
    }

    #[test]
    fn garbage_and_out_of_range_lines_are_malformed() {
        let items = read("12\nabc\n-4\n1048576\n1048575\n");

        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(VmError::MalformedAddress { .. })));
        assert!(matches!(items[2], Err(VmError::MalformedAddress { .. })));
        assert!(matches!(items[3], Err(VmError::MalformedAddress { .. })));
        assert_eq!(items[4].as_ref().unwrap().raw(), 1_048_575);
    }

    #[test]
    fn errors_name_the_line() {
        let err = read("1\n2\nxyz\n").pop().unwrap().unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn read_failure_is_not_a_malformed_address() {
        let input = BufReader::new((&b"7\n\n"[..]).chain(BrokenPipe));
        let items: Vec<_> = AddressReader::new(input).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().raw(), 7);
        assert!(matches!(items[1], Err(VmError::InputUnreadable { line: 3, .. })));
    }
}
