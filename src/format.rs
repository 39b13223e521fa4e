//! Plain-text graph formats.
//!
//! - **Matrix**: the vertex count `n`, then `n` rows of `n` cells `0`/`1`. Cells
//!   may be written together (`0110`) or separated by whitespace. Cell `(i, j)`
//!   set means an edge `i -> j`.
//! - **Adjacency list**: `n`, then for every vertex its out-degree `k` followed
//!   by `k` neighbors.
//! - **Edge list**: `n m`, then `m` undirected edges `u v`.
//!
//! A [`Reader`] can read several graphs in a row from the same text.
//!
//! Header counts are never trusted for allocation: vertex counts above
//! [`MAX_VERTICES`] are rejected, and edge or neighbor lists grow only as data
//! is actually read.
use std::iter::Peekable;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::graph::Graph;

/// Largest vertex count a reader accepts.
pub const MAX_VERTICES: usize = 1 << 24;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Format {
    #[default]
    Matrix,
    AdjacencyList,
    EdgeList,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "matrix" => Ok(Format::Matrix),
            "list" | "adjacency" => Ok(Format::AdjacencyList),
            "edges" => Ok(Format::EdgeList),
            _ => Err(Error::Parse {
                line: 0,
                message: format!("unknown format {s:?}"),
            }),
        }
    }
}

/// Whitespace-separated tokens, with the line each one was found on.
pub struct Reader<'a> {
    tokens: Peekable<Box<dyn Iterator<Item = (usize, &'a str)> + 'a>>,
    line: usize,
}

impl<'a> Reader<'a> {
    pub fn new(text: &'a str) -> Self {
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |token| (i + 1, token)));
        let tokens: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = Box::new(tokens);
        Reader {
            tokens: tokens.peekable(),
            line: 0,
        }
    }

    pub fn read(&mut self, format: Format) -> Result<Graph> {
        match format {
            Format::Matrix => self.read_matrix(),
            Format::AdjacencyList => self.read_adjacency_list(),
            Format::EdgeList => self.read_edge_list(),
        }
    }

    pub fn read_matrix(&mut self) -> Result<Graph> {
        let size = self.size()?;
        let Some(cells) = size.checked_mul(size) else {
            return Err(self.error(format!("matrix of size {size} is too large")));
        };
        let mut edges = Vec::new();
        let mut cell = 0;
        while cell < cells {
            let token = self.token()?;
            // a token never spans two rows
            if cell % size + token.len() > size {
                return Err(self.error(format!("row longer than {size} cells")));
            }
            for c in token.chars() {
                match c {
                    '1' => edges.push((cell / size, cell % size)),
                    '0' => {}
                    _ => return Err(self.error(format!("unexpected matrix cell {c:?}"))),
                }
                cell += 1;
            }
        }
        Graph::from_edges(size, edges)
    }

    pub fn read_adjacency_list(&mut self) -> Result<Graph> {
        let size = self.size()?;
        let mut neighbors = Vec::new();
        for _ in 0..size {
            let degree = self.number()?;
            let mut list = Vec::new();
            for _ in 0..degree {
                list.push(self.vertex(size)?);
            }
            neighbors.push(list);
        }
        Graph::from_adjacency(neighbors)
    }

    pub fn read_edge_list(&mut self) -> Result<Graph> {
        let size = self.size()?;
        let count = self.number()?;
        let mut edges = Vec::new();
        for _ in 0..count {
            edges.push((self.vertex(size)?, self.vertex(size)?));
        }
        Graph::undirected(size, edges)
    }

    /// True once every token has been consumed.
    pub fn is_done(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Line of the next unread token, if any.
    fn next_line(&mut self) -> Option<usize> {
        self.tokens.peek().map(|&(line, _)| line)
    }

    fn token(&mut self) -> Result<&'a str> {
        match self.tokens.next() {
            Some((line, token)) => {
                self.line = line;
                Ok(token)
            }
            None => Err(self.error("unexpected end of input".to_string())),
        }
    }

    fn number(&mut self) -> Result<usize> {
        let token = self.token()?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected a number, found {token:?}")))
    }

    /// A vertex count, bounded by [`MAX_VERTICES`].
    fn size(&mut self) -> Result<usize> {
        let size = self.number()?;
        if size > MAX_VERTICES {
            return Err(self.error(format!("{size} vertices exceeds the limit of {MAX_VERTICES}")));
        }
        Ok(size)
    }

    fn vertex(&mut self, size: usize) -> Result<usize> {
        let vertex = self.number()?;
        if vertex >= size {
            return Err(Error::VertexOutOfRange { vertex, size });
        }
        Ok(vertex)
    }

    fn error(&self, message: String) -> Error {
        Error::Parse {
            line: self.line,
            message,
        }
    }
}

/// Parse a single graph, rejecting trailing input.
pub fn parse(text: &str, format: Format) -> Result<Graph> {
    let mut reader = Reader::new(text);
    let g = reader.read(format)?;
    if let Some(line) = reader.next_line() {
        return Err(Error::Parse {
            line,
            message: "trailing input after graph".to_string(),
        });
    }
    Ok(g)
}

/// Render `g` in matrix format, one row per line.
pub fn to_matrix(g: &Graph) -> String {
    let mut out = format!("{}\n", g.size());
    for u in 0..g.size() {
        let row: String = (0..g.size())
            .map(|v| if g.contains_edge(u, v) { '1' } else { '0' })
            .collect();
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Render `g` in adjacency-list format, one vertex per line.
pub fn to_adjacency_list(g: &Graph) -> String {
    let mut out = format!("{}\n", g.size());
    for u in 0..g.size() {
        let fields: Vec<String> = std::iter::once(g.degree(u))
            .chain(g.neighbors(u).iter().copied())
            .map(|x| x.to_string())
            .collect();
        out.push_str(&fields.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_matrix() {
        let g = parse("3\n011\n001\n100\n", Format::Matrix).unwrap();
        assert_eq!(g, Graph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 0)]).unwrap());

        // separated cells
        let h = parse("3\n0 1 1\n0 0 1\n1 0 0", Format::Matrix).unwrap();
        assert_eq!(g, h);
        assert_eq!(parse(&to_matrix(&g), Format::Matrix).unwrap(), g);
    }

    #[test]
    fn test_read_matrix_errors() {
        assert!(matches!(
            parse("2\n01\n2", Format::Matrix),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse("2\n01\n1", Format::Matrix),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse("2\n011\n0", Format::Matrix),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_adjacency_list() {
        let g = parse("4\n2 1 3\n1 2\n0\n1 0\n", Format::AdjacencyList).unwrap();
        assert_eq!(g.neighbors(0), &[1, 3]);
        assert_eq!(g.neighbors(2), &[] as &[usize]);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(parse(&to_adjacency_list(&g), Format::AdjacencyList).unwrap(), g);
        assert_eq!(
            parse("2\n1 2\n0", Format::AdjacencyList),
            Err(Error::VertexOutOfRange { vertex: 2, size: 2 })
        );
    }

    #[test]
    fn test_read_edge_list() {
        let g = parse("3 2\n0 1\n1 1\n", Format::EdgeList).unwrap();
        assert_eq!(g.neighbors(1), &[0, 1]);
        assert_eq!(g.neighbors(0), &[1]);
        assert!(matches!(
            parse("3 2\n0 1\n", Format::EdgeList),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_two_graphs_in_a_row() {
        let mut reader = Reader::new("2\n01\n10\n2\n00 00\n");
        let a = reader.read(Format::Matrix).unwrap();
        assert!(!reader.is_done());
        let b = reader.read(Format::Matrix).unwrap();
        assert!(reader.is_done());
        assert_eq!(a.edge_count(), 2);
        assert_eq!(b.edge_count(), 0);
    }

    #[test]
    fn test_trailing_input() {
        assert!(matches!(
            parse("1\n0\n7", Format::Matrix),
            Err(Error::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("matrix".parse::<Format>(), Ok(Format::Matrix));
        assert_eq!("list".parse::<Format>(), Ok(Format::AdjacencyList));
        assert_eq!("edges".parse::<Format>(), Ok(Format::EdgeList));
        assert!("dot".parse::<Format>().is_err());
    }

    #[test]
    fn test_oversized_headers_are_rejected() {
        // edge count far beyond the data
        assert!(matches!(
            parse("3 1000000000000000000\n0 1\n", Format::EdgeList),
            Err(Error::Parse { line: 2, .. })
        ));
        // vertex counts beyond the limit, in every format
        let huge = usize::MAX.to_string();
        for format in [Format::Matrix, Format::AdjacencyList, Format::EdgeList] {
            assert!(matches!(
                parse(&format!("{huge} 0\n"), format),
                Err(Error::Parse { line: 1, .. })
            ));
        }
        assert!(matches!(
            parse(&format!("{} 0\n", MAX_VERTICES + 1), Format::EdgeList),
            Err(Error::Parse { .. })
        ));
        // neighbor count far beyond the data
        assert!(matches!(
            parse("2\n1000000000000000000 1\n0\n", Format::AdjacencyList),
            Err(Error::Parse { .. })
        ));
    }
}
