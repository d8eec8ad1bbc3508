use std::fmt::{self, Display};

use super::{SendEmail, send_email};

pub struct ResetCodeTemplate<'a> {
    pub name: &'a str,
    pub code: &'a str,
}

impl<'a> Display for ResetCodeTemplate<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let html_template = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="utf-8">
                <title>Reset Your Password</title>
                <style>
                    body {{
                        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
                        background-color: #f9fafb;
                        margin: 0;
                    }}
                    .container {{
                        max-width: 600px;
                        margin: 0 auto;
                        padding: 20px;
                    }}
                    .code-container {{
                        text-align: center;
                        margin: 40px 0;
                        padding: 30px;
                        background-color: #ffffff;
                        border-radius: 8px;
                    }}
                    .reset-code {{
                        font-size: 32px;
                        font-weight: bold;
                        letter-spacing: 4px;
                        color: #2563eb;
                        margin: 20px 0;
                    }}
                    .message {{
                        color: #4b5563;
                        font-size: 14px;
                    }}
                </style>
            </head>
            <body>
                <div class="container">
                    <div class="code-container">
                        <h2 style="color: #111827; margin: 0;">Hi {}, reset your password</h2>
                        <div class="reset-code">{}</div>
                        <p class="message">
                            Enter this code along with your new password.<br>
                            It is single-use and expires shortly. If you didn't ask
                            for a reset, you can ignore this email.
                        </p>
                    </div>
                </div>
            </body>
            </html>
            "#,
            self.name, self.code
        );
        write!(f, "{}", html_template)
    }
}

impl<'a> SendEmail for ResetCodeTemplate<'a> {
    fn send(&self, email: &str) -> crate::prelude::Result<()> {
        send_email(
            email,
            "Your password reset code",
            &format!("{}", &self),
            true,
        )?;
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn template_renders_name_and_code() {
        let rendered = ResetCodeTemplate {
            name: "Asha",
            code: "394093",
        }
        .to_string();
        assert!(rendered.contains("Asha"));
        assert!(rendered.contains("394093"));
    }
}
