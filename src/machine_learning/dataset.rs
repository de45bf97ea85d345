//! Labelled training messages.
//!
//! The built-in corpus covers the Indonesian/English scam families the
//! lexicon targets. Scam messages are augmented with upper- and lower-case
//! copies, legitimate ones with a capitalised copy, then the whole set is
//! shuffled with a fixed seed.

use super::Label;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SCAM_MESSAGES: &[&str] = &[
    // Fake online invitations
    "UNDANGAN WEBINAR GRATIS! Sertifikat langsung! Klik: www.webinargratis2024.com",
    "Zoom Meeting Invitation - Join now: http://fake-zoom-meeting.com/12345",
    "SEMINAR ONLINE GRATIS! Dapat e-certificate! Daftar: www.seminarkeren.com",
    "Undangan meeting penting! Klik link ini untuk join: http://meeting-urgent.com",
    "WEBINAR EKSKLUSIF! Terbatas 100 orang! Buruan daftar: www.webinar-limited.com",
    "Google Meet Invitation - Click to join: http://fake-meet.com/abc123",
    "PELATIHAN ONLINE GRATIS + SERTIFIKAT! Daftar sekarang limited! www.pelatihangratis.com",
    "Zoom Meeting ID: 123456789. Password akan dikirim setelah transfer Rp 50rb",
    // Telco lottery
    "Plgn Yth, selamat no Anda Resmi men-dpat Hadiah Rp.150jt Berkat isi ulang pulsa dari MOBOINDOSAT NO PIN;25e477rU/info klik; www.hadiahmboindosat2017.com",
    "SELAMAT! Nomor Anda terpilih sbg pemenang undian TELKOMSEL berhadiah Rp 75 juta. PIN: 892KL45. Info: www.hadiahtelkomsel2024.com",
    "Congratulations! Your number won Indosat Lottery Rp 100 Million. PIN: 7821XX. Click www.indosatprize.com",
    "Plgn Yth, Anda mendapat HADIAH Rp 200 jt dari program isi ulang XL. Kode: A12345. Klik: www.xlhadiah.com",
    "SELAMAT Anda pemenang undian Tri berhadiah motor + uang tunai 50 juta! PIN:91827. Hub: www.triundian.com",
    // Generic lottery
    "SELAMAT! Anda menang undian Rp50.000.000! Transfer biaya admin Rp500rb ke 081234567890",
    "Congratulations! You won $1,000,000 lottery. Send processing fee to claim prize",
    "ANDA PEMENANG UNDIAN BRI! Hadiah 100 JUTA! Hub 08123456789 segera!",
    "Selamat! Nomor HP anda terpilih sebagai pemenang undian Indomaret senilai 25 juta",
    "WINNER ANNOUNCEMENT! You won iPhone 15 Pro Max! Click link to claim now!",
    "Selamat! Anda dapat hadiah 75 juta dari undian Alfamart. Transfer ongkir 200rb utk pengiriman",
    "CONGRATULATIONS! Your email won €500,000 in international lottery. Click here to claim",
    // Banking phishing
    "Urgent! Akun bank Anda akan diblokir. Klik link ini segera untuk verifikasi",
    "URGENT: Your package cannot be delivered. Click here to update address",
    "BCA INFO: Rekening Anda mencurigakan. Verifikasi di http://fake-bca.com atau diblokir",
    "Your account has been compromised. Reset password immediately: http://fake.com",
    "PERHATIAN! Kartu ATM anda akan diblokir. Hubungi 021-12345678 untuk aktivasi",
    "Mandiri Alert: Transaksi mencurigakan terdeteksi. Konfirmasi segera di link ini",
    "BNI: Akun Anda di suspend. Update data di www.bni-update.com dalam 24 jam",
    // Fake investments
    "PROMO KHUSUS! Investasi modal 1jt jadi 10jt dalam sebulan! WA 08123456789",
    "KERJA DARI RUMAH! Penghasilan 10jt/bulan! Daftar sekarang gratis!",
    "Investasi saham untung 500% dijamin! Hub: 08123456789",
    "Bisnis online omzet milyaran! Join sekarang modal 1jt! Balik modal 1 minggu!",
    "CRYPTOCURRENCY INVESTMENT! 1000% return guaranteed! Limited slots!",
    "Trading forex profit 200% per hari! Modal 500rb jadi 10jt! Terbukti!",
    "MLM terbaru! Passive income 50 juta/bulan! Join dengan bonus langsung!",
    // Illegal online loans
    "DANA DARURAT CEPAT! Pinjaman tanpa jaminan, bunga rendah. Hubungi sekarang!",
    "Pinjaman online cepat cair! Tanpa survei! KTP saja! WA 08111222333",
    "Butuh dana tunai? Pinjaman 20 juta cair hari ini! Bunga 0%! Call now!",
    "LOAN APPROVED! Transfer Rp 10jt ke rekening Anda hari ini. Admin fee 500rb",
    "Dana Cepat! Pinjam 50 juta dalam 1 jam! Tanpa BI checking! Bunga flat!",
    // Fake prizes
    "Anda mendapat hadiah dari program loyalitas. Klik link berikut untuk klaim",
    "GRATIS! Dapatkan voucher 500rb! Klik link dan masukkan data pribadi Anda",
    "Anda menang giveaway! Transfer ongkir 100rb untuk pengiriman hadiah",
    "FREE iPhone 14! You're selected! Pay $50 shipping fee to receive",
    "Selamat! Anda pemenang giveaway Shopee 10 juta! Bayar verifikasi 150rb",
    // Product fraud
    "PROMO TERBATAS! iPhone 14 Pro hanya 2jt! Stok terbatas! Transfer sekarang!",
    "OBAT KUAT HERBAL! Dijamin ampuh! Hasil permanen! Order: 08123456789",
    "JUAL MOBIL MURAH! Toyota Avanza 2022 hanya 50 juta! DP 5 juta! Call now!",
    "Jam tangan Rolex asli harga 1 juta! Limited edition! Transfer sekarang!",
    // Fake verification
    "Akun Anda terblokir. Segera hubungi customer service di nomor ini: 021-123456",
    "Verifikasi akun Anda segera atau akan dihapus permanent. Klik link ini",
    "WhatsApp akan dihapus! Verifikasi nomor Anda sekarang: http://fake-wa.com",
    "Instagram: Akun Anda dilaporkan. Verifikasi identitas di link ini atau di-suspend",
    // Family emergency
    "MA/PA TOLONG! Aku kecelakaan butuh dana urgent! Transfer ke 08123456789!",
    "DARURAT! Adik kamu ditahan polisi! Perlu uang tebusan! Hub 08111222333!",
    "HELP! Anak Anda kecelakaan di RS. Perlu dana operasi 50 juta segera! Call 08xxx",];

const LEGITIMATE_MESSAGES: &[&str] = &[
    // Short safe text
    "Selamat pagi",
    "Terima kasih",
    "Halo kamu",
    "Baik",
    "Oke siap",
    "Ya nanti",
    "Maaf ya",
    "Silakan",
    "Mohon tunggu",
    "Selamat siang, ada yang bisa dibantu?",
    "Kamu sudah makan?",
    "Oke terima kasih banyak",
    "Selamat ulang tahun!",
    "Selamat atas prestasinya",
    "Halo, apa kabar?",
    "Sampai jumpa besok",
    "Semangat ya!",
    // Business
    "Hai, besok meeting jam 2 siang ya. Jangan lupa bawa laptop",
    "Terima kasih atas pesanannya. Barang akan dikirim besok pagi via JNE",
    "Invoice bulan ini sudah saya kirim. Mohon dicek dan dikonfirmasi",
    "Presentasi kemarin bagus. Klien tertarik untuk lanjut kerjasama",
    "Project sprint review hari Jumat jam 3 sore. Siapkan demo",
    "Dokumentasi lengkap sudah saya kirim via email. Cek inbox ya",
    "Boleh minta tolong review document ini? Deadline Jumat depan",
    "Report bulan ini sudah selesai. Saya upload di Google Drive ya",
    // Reminders
    "Reminder: Deadline tugas besar tanggal 15 Desember. Jangan telat ya!",
    "Meeting hari ini ditunda jadi besok jam 10 pagi. Mohon maaf",
    "Jadwal training minggu depan Senin-Rabu. Lokasi di kantor pusat",
    "Absen dulu ya sebelum masuk kelas. Jangan lupa bawa kartu mahasiswa",
    "Pengumuman: Libur tanggal 17 Agustus. Kantor tutup. Terima kasih",
    "Jangan lupa besok presentasi jam 9 pagi. Dress code formal ya",
    // Personal
    "Selamat ulang tahun! Semoga panjang umur dan sehat selalu",
    "Terima kasih sudah datang ke acara kemarin. Senang bisa bertemu",
    "Mau pesan nasi kotak berapa orang untuk acara besok?",
    "Kapan bisa ketemu? Saya mau diskusi project bareng kamu",
    "Makasih ya udah bantuin kemarin. Next time gantian aku yang traktir",
    // Confirmations
    "Selamat pagi, saya dari HRD ingin konfirmasi jadwal interview Anda",
    "Paket Anda sudah sampai di kantor pos. Silakan diambil dengan membawa KTP",
    "Kakak, transfer untuk pesanan kemarin sudah saya terima. Terima kasih",
    "Maaf mengganggu, saya mau tanya soal spesifikasi produk",
    "Terima kasih feedback-nya. Akan kami perbaiki di versi berikutnya",
    // Banking notices
    "Saldo rekening Anda: Rp 5.000.000. Terima kasih telah menggunakan layanan kami",
    "Transaksi berhasil. Pembelian di Indomaret Rp 50.000. Saldo: Rp 1.500.000",
    "Info BCA: Tagihan kartu kredit Anda bulan ini Rp 2.500.000. Jatuh tempo 25 Des",
    "Mandiri: Transfer dari JOHN DOE Rp 1.000.000 berhasil masuk ke rekening Anda",
    // E-commerce
    "Pesanan Anda sedang dikemas. Estimasi sampai 2-3 hari kerja",
    "Terima kasih sudah berbelanja. Jangan lupa review produknya ya!",
    "Produk yang Anda cari sudah ready stock. Silakan order via aplikasi",
    // Customer Service
    "Terima kasih telah menghubungi kami. Tim kami akan segera follow up",
    "Keluhan Anda sudah kami terima. Mohon tunggu maksimal 3x24 jam",
    // Internal invitations
    "Undangan meeting tim besok via Zoom jam 10 pagi. Link menyusul via email",
    "Webinar internal perusahaan hari Rabu. Link resmi dari HRD",
    "Meeting review project via Google Meet. Cek kalender untuk link",
    "Undangan rapat koordinasi. Link Zoom ada di email invitation",];

/// Walkthrough messages covering every cascade branch; not used for training.
pub const DEMO_MESSAGES: &[&str] = &[
    // Telco lottery
    "Plgn Yth, selamat no Anda Resmi men-dpat Hadiah Rp.150jt Berkat isi ulang pulsa dari MOBOINDOSAT NO PIN;25e477rU/info klik; www.hadiahmboindosat2017.com",
    "SELAMAT! Nomor Anda terpilih pemenang undian TELKOMSEL Rp 75 juta. PIN: 892KL45. www.hadiahtelkomsel.com",
    "Congratulations! Indosat Lottery winner Rp 100 Million. Click www.indosatprize.com",
    // Short with indicators
    "Selamat menang hadiah!",
    "Transfer sekarang!",
    "Klik link ini",
    // Short and safe
    "Selamat pagi",
    "Terima kasih",
    "Halo kamu",
    "Baik",
    // Long scams
    "URGENT! Akun bank Anda diblokir. Verifikasi: www.fake-bca.com",
    "INVESTASI modal 1 juta jadi 10 juta! Profit 500% dijamin! WA 08123",
    // Long legitimate
    "Meeting besok jam 2 siang. Jangan lupa bawa proposal",
    "Terima kasih pesanannya. Barang dikirim besok via JNE",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub text: String,
    pub label: Label,
}

/// On-disk dataset layout (YAML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default)]
    pub scam: Vec<String>,
    #[serde(default)]
    pub legitimate: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn builtin(seed: u64) -> Self {
        Self::from_messages(SCAM_MESSAGES, LEGITIMATE_MESSAGES, seed)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, seed: u64) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: DatasetFile = serde_yaml::from_str(&content)?;
        Ok(Self::from_messages(&file.scam, &file.legitimate, seed))
    }

    pub fn from_messages<S: AsRef<str>>(scam: &[S], legitimate: &[S], seed: u64) -> Self {
        let mut samples = Vec::with_capacity(scam.len() * 3 + legitimate.len() * 2);

        for message in scam {
            let message = message.as_ref();
            for text in [message.to_string(), message.to_uppercase(), message.to_lowercase()] {
                samples.push(Sample {
                    text,
                    label: Label::Scam,
                });
            }
        }
        for message in legitimate {
            let message = message.as_ref();
            for text in [message.to_string(), capitalize(message)] {
                samples.push(Sample {
                    text,
                    label: Label::Legitimate,
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        samples.shuffle(&mut rng);

        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn count(&self, label: Label) -> usize {
        self.samples.iter().filter(|s| s.label == label).count()
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_augmentation_counts() {
        let dataset = Dataset::builtin(42);
        assert_eq!(dataset.count(Label::Scam), SCAM_MESSAGES.len() * 3);
        assert_eq!(dataset.count(Label::Legitimate), LEGITIMATE_MESSAGES.len() * 2);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let a = Dataset::builtin(42);
        let b = Dataset::builtin(42);
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hai, BESOK meeting"), "Hai, besok meeting");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_load_yaml_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.yaml");
        std::fs::write(
            &path,
            "scam:\n  - \"Anda menang undian!\"\nlegitimate:\n  - \"Sampai jumpa besok\"\n",
        )
        .unwrap();

        let dataset = Dataset::load_from_file(&path, 1).unwrap();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.count(Label::Scam), 3);
    }
}
