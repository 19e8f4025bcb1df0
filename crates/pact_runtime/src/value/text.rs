use super::Value;

/// Text building used by string concatenation.
pub trait Appendable {
    fn append_str(&mut self, s: &str);
    fn append_i64(&mut self, i: i64);
    fn append_f64(&mut self, f: f64);
    fn append_bool(&mut self, b: bool);
    fn append_value(&mut self, v: &Value);
}

impl Appendable for String {
    fn append_str(&mut self, s: &str) {
        self.push_str(s);
    }

    fn append_i64(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.push_str(buf.format(i));
    }

    fn append_f64(&mut self, f: f64) {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
            self.append_i64(f as i64);
        } else if f.is_finite() {
            let mut buf = ryu::Buffer::new();
            self.push_str(buf.format_finite(f));
        } else if f.is_nan() {
            self.push_str("NaN");
        } else if f > 0.0 {
            self.push_str("Infinity");
        } else {
            self.push_str("-Infinity");
        }
    }

    fn append_bool(&mut self, b: bool) {
        self.push_str(if b { "true" } else { "false" });
    }

    fn append_value(&mut self, v: &Value) {
        match v {
            // Void contributes nothing to text.
            Value::Void => {}
            Value::Boolean(b) => self.append_bool(*b),
            Value::Integer(i) => self.append_i64(*i),
            Value::Real(r) => self.append_f64(*r),
            Value::String(s) => self.append_str(s),
            Value::Contract(c) => self.append_str(&c.to_string()),
            Value::Array(a) => append_seq(self, &a.values()),
            Value::List(l) => append_seq(self, &l.values()),
            Value::Object(o) => self.append_str(&o.contract().to_string()),
            Value::Function(f) => {
                self.append_str("function ");
                self.append_str(f.name());
            }
            Value::Iterator(_) => self.append_str("iterator"),
        }
    }
}

fn append_seq(out: &mut String, items: &[Value]) {
    out.push('[');
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.append_value(v);
    }
    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_compactly() {
        let mut s = String::new();
        s.append_f64(3.0);
        s.push(' ');
        s.append_f64(2.5);
        s.push(' ');
        s.append_i64(-42);
        assert_eq!(s, "3 2.5 -42");
    }

    #[test]
    fn void_renders_empty() {
        assert_eq!(Value::Void.to_text(), "");
        assert_eq!(Value::from(true).to_text(), "true");
    }
}
